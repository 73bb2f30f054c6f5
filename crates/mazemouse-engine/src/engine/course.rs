use crate::core::{Maze, Position, Solution, solve};

/// A maze together with its solution, shared read-only by every agent of an
/// episode.
#[derive(Debug, Clone)]
pub struct Course {
    maze: Maze,
    solution: Solution,
}

impl Course {
    /// Solves `maze` once up front.
    #[must_use]
    pub fn new(maze: Maze) -> Self {
        let solution = solve(maze.cells());
        Self { maze, solution }
    }

    #[must_use]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    #[must_use]
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solution.is_solved()
    }

    /// Progress value of the cell containing `position`, 0 outside the maze.
    #[must_use]
    pub fn progress_at(&self, position: Position) -> u32 {
        self.maze
            .cell_at(position)
            .map_or(0, |cell| self.solution.progress().get(cell))
    }
}
