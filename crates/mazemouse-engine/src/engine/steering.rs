//! Reflex steering computed from a [`SensorReading`].
//!
//! Both rules form a signed weighted sum of per-ray distances (left rays carry
//! negative weights) and normalize it by the largest distance seen. The
//! straight-ahead ray is left out because it has no side to steer towards.

use super::SensorReading;

/// Gain applied to the dead-end rule.
const DEAD_END_GAIN: f64 = 5.0;

/// Largest visited intensity a single pixel can hold.
const MAX_INTENSITY: f64 = 255.0;

/// Steering towards the most open side, ignoring the visited trail.
///
/// Used in dead ends, where the trail laid down while entering would
/// otherwise repel the agent from the only way out.
#[must_use]
pub fn dead_end_steering(reading: &SensorReading) -> f64 {
    let mut sum = 0.0;
    let mut max_distance = 1.0_f64;
    for ray in reading.rays().iter().filter(|ray| ray.angle != 0.0) {
        let distance = f64::from(ray.wall_distance);
        sum += distance * ray.weight;
        max_distance = max_distance.max(distance);
    }
    DEAD_END_GAIN * sum / max_distance
}

/// Discounts `wall_distance` by the visited intensity along the ray.
///
/// The discount grows as the ray gets shorter, so rays ending right next to a
/// wall are very sensitive to the trail. The result never drops below zero.
#[must_use]
pub fn effective_distance(wall_distance: u32, visited_intensity: u32, avoidance_factor: f64) -> f64 {
    if wall_distance == 0 {
        return 0.0;
    }
    let distance = f64::from(wall_distance);
    let discount = f64::from(visited_intensity) * avoidance_factor / (MAX_INTENSITY * distance);
    (distance * (1.0 - discount)).max(0.0)
}

/// Steering towards open ground not recently visited.
#[must_use]
pub fn avoidance_steering(reading: &SensorReading, multiplier: f64, avoidance_factor: f64) -> f64 {
    let mut sum = 0.0;
    let mut max_distance = 1.0_f64;
    for ray in reading.rays().iter().filter(|ray| ray.angle != 0.0) {
        let distance = effective_distance(ray.wall_distance, ray.visited_intensity, avoidance_factor);
        sum += distance * ray.weight;
        max_distance = max_distance.max(distance);
    }
    sum * multiplier / max_distance
}

/// Picks the dead-end or the avoidance rule for this reading.
#[must_use]
pub fn reflex_steering(
    reading: &SensorReading,
    square_size: u32,
    multiplier: f64,
    avoidance_factor: f64,
) -> f64 {
    if reading.is_empty() {
        0.0
    } else if reading.is_dead_end(square_size) {
        dead_end_steering(reading)
    } else {
        avoidance_steering(reading, multiplier, avoidance_factor)
    }
}
