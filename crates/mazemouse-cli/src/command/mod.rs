use clap::{Parser, Subcommand};

use self::{generate::GenerateArg, run::RunArg, solve::SolveArg};

mod generate;
mod run;
mod solve;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Generate a perfect maze and write it in the text maze format
    Generate(#[clap(flatten)] GenerateArg),
    /// Solve a maze file and print its path length and progress field
    Solve(#[clap(flatten)] SolveArg),
    /// Run agents through mazes, episode after episode
    Run(#[clap(flatten)] RunArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Generate(arg) => generate::run(&arg)?,
        Mode::Solve(arg) => solve::run(&arg)?,
        Mode::Run(arg) => run::run(&arg)?,
    }
    Ok(())
}
