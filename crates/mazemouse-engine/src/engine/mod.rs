//! Per-frame agent simulation.
//!
//! - [`Sensor`] / [`RayTable`] - Ray casting against the maze and the agent's own trail
//! - [`steering`] - Reflex steering rules for dead ends and open ground
//! - [`AgentParams`] / [`MotionLimits`] - Per-agent tunables and kinematic limits
//! - [`Agent`] - Kinematics, trail, progress tracking and the status state machine
//! - [`Course`] - A maze and its solution, shared by all agents of an episode
//! - [`Policy`] / [`Control`] - The decision seam fed with sensor features
//!
//! # Frame Flow
//!
//! 1. Crash if the agent's pixel is a wall
//! 2. Cast every ray of the table and build the feature vector
//! 3. Ask the policy for a [`Control`]
//! 4. Add reflex steering, clamp steering and speed, move
//! 5. Stamp the trail, fade on cadence, ratchet best progress
//! 6. Check for timeout, exit and spin-out, in that order

pub use self::{agent::*, agent_params::*, course::*, policy::*, sensor::*};

mod agent;
mod agent_params;
mod course;
mod policy;
mod sensor;
pub mod steering;
