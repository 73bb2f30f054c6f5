//! Built-in policies.
//!
//! Every policy sees the same input: `(visited count, visited intensity, wall
//! distance)` per ray, in ray-table order, so feature `2` is always the
//! straight-ahead wall distance.
//!
//! - [`ReflexPolicy`] - Leaves steering to the agent's reflexes and sets speed
//!   from the open distance ahead
//! - [`ConstantPolicy`] - Returns the same control every frame
//! - [`LinearPolicy`] - `tanh` of a weighted feature sum, one model per output

use mazemouse_engine::{AgentParams, Control, Policy};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Index of the straight-ahead wall distance in the feature vector.
const AHEAD_DISTANCE: usize = 2;

/// Speeds up when the way ahead is open and brakes when a wall is near.
///
/// The speed request is `4 * ahead / vision - 2`: full braking against a
/// wall, full acceleration with nothing in sight. Steering is left entirely to
/// the agent's reflexes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflexPolicy {
    vision_distance: f64,
}

impl ReflexPolicy {
    #[must_use]
    pub fn new(vision_distance: u32) -> Self {
        Self {
            vision_distance: f64::from(vision_distance.max(1)),
        }
    }

    #[must_use]
    pub fn for_params(params: &AgentParams) -> Self {
        Self::new(params.sensor.vision_distance)
    }
}

impl Policy for ReflexPolicy {
    fn decide(&mut self, features: &[f64]) -> Control {
        let ahead = features.get(AHEAD_DISTANCE).copied().unwrap_or(0.0);
        Control::new(0.0, 4.0 * (ahead / self.vision_distance) - 2.0)
    }
}

/// Returns the same [`Control`] every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantPolicy(pub Control);

impl Policy for ConstantPolicy {
    fn decide(&mut self, _features: &[f64]) -> Control {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LinearPolicyError {
    #[display("{output} weights expect {found} features, the sensor produces {expected}")]
    FeatureCountMismatch {
        output: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Weights of a [`LinearPolicy`], one vector per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWeights {
    pub steering: Vec<f64>,
    pub steering_bias: f64,
    pub speed: Vec<f64>,
    pub speed_bias: f64,
}

impl LinearWeights {
    /// Uniform random weights in `-1.0..=1.0`, zero biases.
    pub fn random<R>(rng: &mut R, feature_count: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut draw = || {
            (0..feature_count)
                .map(|_| rng.random_range(-1.0..=1.0))
                .collect::<Vec<f64>>()
        };
        let steering = draw();
        let speed = draw();
        Self {
            steering,
            steering_bias: 0.0,
            speed,
            speed_bias: 0.0,
        }
    }
}

/// `steering = tanh(w_s . f + b_s) * steering_scale`,
/// `speed = tanh(w_v . f + b_v) * speed_scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPolicy {
    weights: LinearWeights,
    steering_scale: f64,
    speed_scale: f64,
}

/// Largest speed change a linear policy requests, in pixels per frame.
const LINEAR_SPEED_SCALE: f64 = 2.0;

impl LinearPolicy {
    /// Checks `weights` against the feature count of `params`' ray table.
    ///
    /// The steering output is scaled to the per-frame steering rate limit.
    pub fn new(weights: LinearWeights, params: &AgentParams) -> Result<Self, LinearPolicyError> {
        let expected = params.sensor.rays.feature_count();
        for (output, found) in [("steering", weights.steering.len()), ("speed", weights.speed.len())] {
            if found != expected {
                return Err(LinearPolicyError::FeatureCountMismatch {
                    output,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            weights,
            steering_scale: params.limits.steering_delta_max,
            speed_scale: LINEAR_SPEED_SCALE,
        })
    }

    #[must_use]
    pub fn weights(&self) -> &LinearWeights {
        &self.weights
    }
}

fn activate(weights: &[f64], bias: f64, features: &[f64]) -> f64 {
    let sum: f64 = weights.iter().zip(features).map(|(w, f)| w * f).sum();
    (sum + bias).tanh()
}

impl Policy for LinearPolicy {
    fn decide(&mut self, features: &[f64]) -> Control {
        let w = &self.weights;
        Control::new(
            activate(&w.steering, w.steering_bias, features) * self.steering_scale,
            activate(&w.speed, w.speed_bias, features) * self.speed_scale,
        )
    }
}
