//! Static maze data and the per-agent scent field.
//!
//! - [`CellGrid`] - Logical maze, one entry per room or wall
//! - [`PixelGrid`] - The cell grid scaled by the square size, used for collision and sensing
//! - [`Maze`] - Both representations together with the square size
//! - [`MazeGenerator`] - Perfect maze generation by randomized backtracking
//! - [`Solution`] / [`ProgressField`] - Shortest path from entrance to exit
//! - [`VisitedMemory`] - Decaying intensity field of recently visited pixels

pub use self::{
    cell_grid::*, maze::*, maze_generator::*, maze_solver::*, pixel_grid::*, position::*,
    visited_memory::*,
};

pub(crate) mod cell_grid;
pub(crate) mod maze;
pub(crate) mod maze_generator;
pub(crate) mod maze_solver;
pub(crate) mod pixel_grid;
pub(crate) mod position;
pub(crate) mod visited_memory;
