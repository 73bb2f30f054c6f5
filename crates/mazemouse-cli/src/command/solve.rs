use std::path::PathBuf;

use mazemouse_engine::solve;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SolveArg {
    /// Maze file in the text format
    maze: PathBuf,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SolveReport {
    rows: usize,
    cols: usize,
    solved: bool,
    path_length: u32,
    /// Progress per cell scaled to `0..=255`; empty when unsolved.
    progress: Vec<Vec<u8>>,
    /// Raw progress at the exit cell.
    exit_progress: u32,
}

pub(crate) fn run(arg: &SolveArg) -> anyhow::Result<()> {
    let SolveArg { maze, output } = arg;

    let grid = util::read_maze_file(maze)?;
    let solution = solve(&grid);
    if !solution.is_solved() {
        tracing::warn!(maze = %maze.display(), "maze has no path from entrance to exit");
    }
    let exit = grid.exit();
    let report = SolveReport {
        rows: grid.rows(),
        cols: grid.cols(),
        solved: solution.is_solved(),
        path_length: solution.path_length(),
        progress: solution.progress().normalized(solution.path_length()),
        exit_progress: solution.progress().get(exit),
    };
    Output::save_json(&report, output.clone())?;
    Ok(())
}
