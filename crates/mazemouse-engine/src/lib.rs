//! Maze generation, solving and per-agent simulation for maze-running mice.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - Static data: the cell grid, its scaled pixel grid, the maze
//!   generator, the solver producing a progress field, and the decaying
//!   visited-path memory each agent carries.
//! - [`engine`] - Per-frame simulation: ray sensing, steering, kinematics,
//!   the agent status state machine and scoring.
//!
//! # Example
//!
//! ```
//! use mazemouse_engine::{
//!     Agent, AgentParams, Control, Course, DEFAULT_HEADING, Maze, MazeGenerator, MazeSeed,
//! };
//!
//! let seed: MazeSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
//! let cells = MazeGenerator::with_seed(seed).generate(13, 21);
//! let course = Course::new(Maze::new(cells, 70));
//! assert!(course.solution().is_solved());
//!
//! let params = AgentParams::for_maze(13, 21, 70).into_shared();
//! let mut agent = Agent::at_entrance(params, course.maze(), DEFAULT_HEADING);
//! let mut policy = |_: &[f64]| Control::default();
//! while agent.status().is_hunting() {
//!     agent.step(&course, &mut policy);
//! }
//! assert!(agent.status().is_finished());
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
