use std::path::PathBuf;

use mazemouse_engine::{MazeGenerator, MazeSeed, normalize_dimension};

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GenerateArg {
    /// Number of rows, forced odd and at least 5
    #[arg(long, default_value_t = 13)]
    rows: usize,
    /// Number of columns, forced odd and at least 5
    #[arg(long, default_value_t = 21)]
    cols: usize,
    /// 32 hex digit seed; random when omitted
    #[arg(long)]
    seed: Option<MazeSeed>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    let GenerateArg {
        rows,
        cols,
        seed,
        output,
    } = arg;

    let seed = seed.unwrap_or_else(rand::random);
    let (rows, cols) = (normalize_dimension(*rows), normalize_dimension(*cols));
    tracing::info!(%seed, rows, cols, "generating maze");

    let grid = MazeGenerator::with_seed(seed).generate(rows, cols);
    let mut output = Output::from_output_path(output.clone())?;
    output.write_maze(&grid)?;
    tracing::info!(output = output.display_path(), "maze written");
    Ok(())
}
