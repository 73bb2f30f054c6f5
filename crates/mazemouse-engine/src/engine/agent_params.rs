use std::{f64::consts::PI, sync::Arc};

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{RayTable, Sensor};

/// How the spin-out check interprets the heading threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SpinRule {
    /// Only headings above `+threshold` spin out. Turning the other way any
    /// number of times never does.
    #[default]
    Literal,
    /// Headings whose magnitude exceeds the threshold spin out.
    Magnitude,
}

/// Per-frame kinematic limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionLimits {
    /// Lowest speed change per frame, in pixels per frame.
    pub acceleration_min: f64,
    /// Highest speed change per frame, in pixels per frame.
    pub acceleration_max: f64,
    /// Largest absolute steering angle per frame, in radians.
    pub steering_max: f64,
    /// Largest change of steering from one frame to the next, in radians.
    pub steering_delta_max: f64,
    /// Accumulated heading, in radians, at which the agent spins out.
    pub spin_threshold: f64,
    pub spin_rule: SpinRule,
}

impl Default for MotionLimits {
    fn default() -> Self {
        Self {
            acceleration_min: -3.0,
            acceleration_max: 2.0,
            steering_max: PI / 4.0,
            steering_delta_max: PI / 4.0,
            spin_threshold: 30.0,
            spin_rule: SpinRule::Literal,
        }
    }
}

impl MotionLimits {
    /// Rate-limits `requested` against last frame's steering, then caps its
    /// magnitude.
    #[must_use]
    pub fn clamp_steering(&self, requested: f64, previous: f64) -> f64 {
        let rate_limited = if requested < previous - self.steering_delta_max {
            previous - self.steering_delta_max
        } else if requested > previous + self.steering_delta_max {
            previous + self.steering_delta_max
        } else {
            requested
        };
        rate_limited.clamp(-self.steering_max, self.steering_max)
    }

    #[must_use]
    pub fn clamp_acceleration(&self, speed_delta: f64) -> f64 {
        speed_delta
            .max(self.acceleration_min)
            .min(self.acceleration_max)
    }

    #[must_use]
    pub fn is_spun_out(&self, heading: f64) -> bool {
        match self.spin_rule {
            SpinRule::Literal => heading > self.spin_threshold,
            SpinRule::Magnitude => heading.abs() > self.spin_threshold,
        }
    }
}

/// Tunable per-agent parameters, fixed for the length of an episode.
///
/// Agents hold these behind an [`Arc`] so an episode can share one value
/// between many agents or give each its own [perturbed](Self::perturbed)
/// copy. Nothing mutates them once the episode has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Radius of the footprint stamped into visited memory, in pixels.
    pub visited_path_radius: u32,
    /// Full intensity at the centre of the footprint.
    pub trail_intensity: u8,
    pub speed_min: f64,
    pub speed_max: f64,
    pub initial_speed: f64,
    pub steering_multiplier: f64,
    pub visited_path_avoidance_factor: f64,
    pub frames_between_fades: u32,
    /// Distance after which the agent times out, in pixels.
    pub max_distance: f64,
    pub sensor: Sensor,
    pub limits: MotionLimits,
}

const VISITED_PATH_RADIUS: u32 = 20;
const TRAIL_INTENSITY: u8 = 10;
const SPEED_MIN: f64 = 2.0;
const SPEED_MAX: f64 = 5.0;
const STEERING_MULTIPLIER: f64 = 2.5;
/// Slowest speed bound either adjuster leaves behind.
const SPEED_FLOOR: f64 = 1.0;

/// Distance budget for `episode` (1-based) in a `rows` x `cols` maze.
///
/// Later episodes get a longer budget.
#[must_use]
pub fn max_distance_for_episode(rows: usize, cols: usize, square_size: u32, episode: u32) -> f64 {
    #[expect(clippy::cast_precision_loss)]
    let area = (rows * cols) as f64 * f64::from(square_size);
    1.3 * (area / 20.0 + 200.0 * f64::from(episode).sqrt()).round()
}

impl AgentParams {
    /// Default parameters scaled to a maze of the given size.
    #[must_use]
    pub fn for_maze(rows: usize, cols: usize, square_size: u32) -> Self {
        let square = f64::from(square_size);
        let fade_cadence = u32::try_from(rows * cols / 10).unwrap_or(u32::MAX);
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let vision_distance = (2.0 * square).round() as u32;
        Self {
            visited_path_radius: VISITED_PATH_RADIUS,
            trail_intensity: TRAIL_INTENSITY,
            speed_min: SPEED_MIN,
            speed_max: SPEED_MAX,
            initial_speed: square / 50.0,
            steering_multiplier: STEERING_MULTIPLIER,
            visited_path_avoidance_factor: 1.25 * square / (2.0 * f64::from(VISITED_PATH_RADIUS)),
            frames_between_fades: fade_cadence,
            max_distance: max_distance_for_episode(rows, cols, square_size, 1),
            sensor: Sensor::new(RayTable::default(), vision_distance),
            limits: MotionLimits::default(),
        }
        .normalized()
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Raises both speed bounds by one pixel per frame.
    pub fn speed_increase(&mut self) {
        self.speed_min += 1.0;
        self.speed_max += 1.0;
    }

    /// Lowers both speed bounds by one pixel per frame, to no less than 1.
    pub fn speed_decrease(&mut self) {
        self.speed_min = (self.speed_min - 1.0).max(SPEED_FLOOR);
        self.speed_max = (self.speed_max - 1.0).max(SPEED_FLOOR);
    }

    /// Returns a copy with multiplicative Gaussian noise on the tunable
    /// parameters.
    ///
    /// Each of the speed bounds, steering multiplier, avoidance factor and
    /// footprint radius is scaled by an independent sample of `N(1, sigma)`.
    /// A non-positive or non-finite `sigma` returns an unchanged copy.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn perturbed<R>(&self, rng: &mut R, sigma: f64) -> Self
    where
        R: Rng + ?Sized,
    {
        if !(sigma.is_finite() && sigma > 0.0) {
            return self.clone();
        }
        let Ok(noise) = Normal::new(1.0, sigma) else {
            return self.clone();
        };
        let mut scale = |value: f64| value * noise.sample(rng).max(0.0);

        let mut params = self.clone();
        params.speed_min = scale(self.speed_min);
        params.speed_max = scale(self.speed_max);
        params.steering_multiplier = scale(self.steering_multiplier);
        params.visited_path_avoidance_factor = scale(self.visited_path_avoidance_factor);
        params.visited_path_radius = scale(f64::from(self.visited_path_radius)).round() as u32;
        params.normalized()
    }

    /// Restores the invariants other code relies on: speed bounds of at
    /// least 1 with `speed_max >= speed_min`, and a fade cadence of at least
    /// one frame.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.speed_min = self.speed_min.max(SPEED_FLOOR);
        self.speed_max = self.speed_max.max(self.speed_min);
        self.frames_between_fades = self.frames_between_fades.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_defaults_for_standard_maze() {
        let params = AgentParams::for_maze(13, 21, 70);
        assert_eq!(params.visited_path_radius, 20);
        assert_eq!(params.trail_intensity, 10);
        assert_eq!(params.speed_min, 2.0);
        assert_eq!(params.speed_max, 5.0);
        assert!((params.initial_speed - 1.4).abs() < 1e-12);
        assert!((params.visited_path_avoidance_factor - 2.1875).abs() < 1e-12);
        assert_eq!(params.frames_between_fades, 27);
        assert_eq!(params.sensor.vision_distance, 140);
        assert_eq!(params.sensor.rays.len(), 11);
        // 13 * 21 * 70 / 20 + 200 = 1155.5, rounded up
        assert!((params.max_distance - 1.3 * 1156.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_distance_grows_with_episode() {
        let first = max_distance_for_episode(13, 21, 70, 1);
        let fourth = max_distance_for_episode(13, 21, 70, 4);
        assert!((fourth - 1.3 * 1356.0).abs() < 1e-9);
        assert!(fourth > first);
    }

    #[test]
    fn test_tiny_maze_fades_every_frame() {
        let params = AgentParams::for_maze(3, 3, 10);
        assert_eq!(params.frames_between_fades, 1);
    }

    #[test]
    fn test_steering_rate_limit() {
        let limits = MotionLimits::default();
        let delta = limits.steering_delta_max;
        assert_eq!(limits.clamp_steering(10.0 * delta, 0.0), delta);
        assert_eq!(limits.clamp_steering(-10.0 * delta, 0.0), -delta);
        assert_eq!(limits.clamp_steering(0.1, 0.0), 0.1);
        // rate limit passes, magnitude limit applies
        let limits = MotionLimits {
            steering_max: 0.5,
            ..MotionLimits::default()
        };
        assert_eq!(limits.clamp_steering(0.7, 0.4), 0.5);
    }

    #[test]
    fn test_acceleration_clamped_to_nearest_bound() {
        let limits = MotionLimits::default();
        assert_eq!(limits.clamp_acceleration(-10.0), -3.0);
        assert_eq!(limits.clamp_acceleration(10.0), 2.0);
        assert_eq!(limits.clamp_acceleration(1.5), 1.5);
    }

    #[test]
    fn test_spin_rules() {
        let literal = MotionLimits::default();
        assert!(literal.spin_rule.is_literal());
        assert!(literal.is_spun_out(30.5));
        assert!(!literal.is_spun_out(-30.5));
        assert!(!literal.is_spun_out(-1000.0));

        let magnitude = MotionLimits {
            spin_rule: SpinRule::Magnitude,
            ..MotionLimits::default()
        };
        assert!(magnitude.is_spun_out(30.5));
        assert!(magnitude.is_spun_out(-30.5));
        assert!(!magnitude.is_spun_out(29.0));
    }

    #[test]
    fn test_speed_adjusters() {
        let mut params = AgentParams::for_maze(13, 21, 70);
        params.speed_increase();
        assert_eq!((params.speed_min, params.speed_max), (3.0, 6.0));
        for _ in 0..10 {
            params.speed_decrease();
        }
        assert_eq!((params.speed_min, params.speed_max), (1.0, 1.0));
    }

    #[test]
    fn test_perturbed_keeps_invariants() {
        let params = AgentParams::for_maze(13, 21, 70);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut differs = false;
        for _ in 0..50 {
            let p = params.perturbed(&mut rng, 0.5);
            assert!(p.speed_min >= 1.0);
            assert!(p.speed_max >= p.speed_min);
            assert!(p.steering_multiplier >= 0.0);
            assert_eq!(p.sensor, params.sensor);
            differs |= p != params;
        }
        assert!(differs);
        assert_eq!(params.perturbed(&mut rng, 0.0), params);
        assert_eq!(params.perturbed(&mut rng, f64::NAN), params);
    }

    #[test]
    fn test_serde() {
        let params = AgentParams::for_maze(13, 21, 70);
        let json = serde_json::to_string(&params).unwrap();
        let restored: AgentParams = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.visited_path_radius, params.visited_path_radius);
        assert_eq!(restored.frames_between_fades, params.frames_between_fades);
        assert_eq!(restored.sensor.rays.len(), params.sensor.rays.len());
        assert!((restored.max_distance - params.max_distance).abs() < 1e-9);

        let limits: MotionLimits = serde_json::from_str(r#"{"spin_rule": "magnitude"}"#).unwrap();
        assert!(limits.spin_rule.is_magnitude());
        assert_eq!(limits.acceleration_max, 2.0);
    }
}
