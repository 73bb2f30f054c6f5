use serde::{Deserialize, Serialize};

/// Per-frame decision of a [`Policy`].
///
/// Both values are requests: the agent adds `steering_delta` to its reflex
/// steering before rate-limiting and capping it, and clamps `speed_delta` to
/// its acceleration range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub steering_delta: f64,
    pub speed_delta: f64,
}

impl Control {
    #[must_use]
    pub const fn new(steering_delta: f64, speed_delta: f64) -> Self {
        Self {
            steering_delta,
            speed_delta,
        }
    }
}

/// Decides steering and speed from a sensor feature vector.
///
/// `features` holds `(visited count, visited intensity, wall distance)` per
/// ray, in ray-table order. Any `FnMut(&[f64]) -> Control` closure is a
/// policy.
pub trait Policy {
    fn decide(&mut self, features: &[f64]) -> Control;
}

impl<F> Policy for F
where
    F: FnMut(&[f64]) -> Control,
{
    fn decide(&mut self, features: &[f64]) -> Control {
        self(features)
    }
}
