//! Simulation configuration loaded from JSON.
//!
//! Every field is optional in the file; missing fields take the defaults of a
//! 13 x 21 maze with 70 px squares. Agent parameters are derived from the maze
//! size first and then patched with [`AgentOverrides`].

use std::path::PathBuf;

use mazemouse_engine::{AgentParams, MotionLimits, RayTable, max_distance_for_episode};
use serde::{Deserialize, Serialize};

/// Which driver every agent of a run gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Reflex steering with distance-based speed control
    #[default]
    Reflex,
    /// Reflex steering only, constant speed
    Constant,
    /// Linear feature weights on top of the reflexes
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub rows: usize,
    pub cols: usize,
    pub square_size: u32,
    pub agents: usize,
    pub episodes: u32,
    /// Fixed distance budget; grows with the episode number when unset.
    pub max_distance: Option<f64>,
    /// Standard deviation of the multiplicative noise applied per agent.
    pub parameter_jitter: f64,
    pub policy: PolicyKind,
    /// Weights file for [`PolicyKind::Linear`]; random weights when unset.
    pub weights: Option<PathBuf>,
    /// Directory where mazes that no agent solved are saved.
    pub failed_maze_dir: Option<PathBuf>,
    pub agent: AgentOverrides,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 13,
            cols: 21,
            square_size: 70,
            agents: 8,
            episodes: 1,
            max_distance: None,
            parameter_jitter: 0.0,
            policy: PolicyKind::Reflex,
            weights: None,
            failed_maze_dir: None,
            agent: AgentOverrides::default(),
        }
    }
}

impl SimulationConfig {
    /// Base agent parameters for `episode` (1-based) in a `rows` x `cols` maze.
    #[must_use]
    pub fn agent_params(&self, rows: usize, cols: usize, episode: u32) -> AgentParams {
        let mut params = AgentParams::for_maze(rows, cols, self.square_size);
        params.max_distance = self
            .max_distance
            .unwrap_or_else(|| max_distance_for_episode(rows, cols, self.square_size, episode));
        self.agent.apply(&mut params);
        params.normalized()
    }
}

/// Values replacing the size-derived agent defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOverrides {
    pub visited_path_radius: Option<u32>,
    pub trail_intensity: Option<u8>,
    pub speed_min: Option<f64>,
    pub speed_max: Option<f64>,
    pub initial_speed: Option<f64>,
    pub steering_multiplier: Option<f64>,
    pub visited_path_avoidance_factor: Option<f64>,
    pub frames_between_fades: Option<u32>,
    pub vision_distance: Option<u32>,
    pub rays: Option<RayTable>,
    pub limits: Option<MotionLimits>,
    /// Applied after the speed bounds: positive values speed up, negative
    /// values slow down, one pixel per frame per step.
    pub speed_offset: i32,
}

impl AgentOverrides {
    fn apply(&self, params: &mut AgentParams) {
        if let Some(v) = self.visited_path_radius {
            params.visited_path_radius = v;
        }
        if let Some(v) = self.trail_intensity {
            params.trail_intensity = v;
        }
        if let Some(v) = self.speed_min {
            params.speed_min = v;
        }
        if let Some(v) = self.speed_max {
            params.speed_max = v;
        }
        if let Some(v) = self.initial_speed {
            params.initial_speed = v;
        }
        if let Some(v) = self.steering_multiplier {
            params.steering_multiplier = v;
        }
        if let Some(v) = self.visited_path_avoidance_factor {
            params.visited_path_avoidance_factor = v;
        }
        if let Some(v) = self.frames_between_fades {
            params.frames_between_fades = v;
        }
        if let Some(v) = self.vision_distance {
            params.sensor.vision_distance = v;
        }
        if let Some(rays) = &self.rays {
            params.sensor.rays = rays.clone();
        }
        if let Some(limits) = self.limits {
            params.limits = limits;
        }
        for _ in 0..self.speed_offset.unsigned_abs() {
            if self.speed_offset > 0 {
                params.speed_increase();
            } else {
                params.speed_decrease();
            }
        }
    }
}
