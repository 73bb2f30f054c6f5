use std::f64::consts::FRAC_PI_2;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::{Maze, Position, VisitedMemory};

/// Maximum number of rays a [`RayTable`] may hold.
pub const MAX_RAYS: usize = 16;

/// Number of features each ray contributes to the policy input.
pub const FEATURES_PER_RAY: usize = 3;

/// Maximum length of a [`SensorReading::features`] vector.
pub const MAX_FEATURES: usize = MAX_RAYS * FEATURES_PER_RAY;

/// Tolerance used when deciding whether a ray lies within ±90° of heading.
const HALF_TURN_EPSILON: f64 = 1e-9;

/// One sensing probe: an angular offset from heading and its steering weight.
///
/// Angles are in radians, negative to the left of the heading. Weights on the
/// left side are negative so that a weighted sum of distances steers towards
/// the more open side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionRay {
    pub angle: f64,
    pub weight: f64,
}

impl VisionRay {
    #[must_use]
    pub fn from_degrees(degrees: f64, weight: f64) -> Self {
        Self {
            angle: degrees.to_radians(),
            weight,
        }
    }

    #[must_use]
    pub fn is_straight_ahead(&self) -> bool {
        self.angle == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RayTableError {
    #[display("ray table is empty")]
    Empty,
    #[display("first ray must point straight ahead")]
    FirstNotStraightAhead,
    #[display("ray table holds {count} rays, at most 16 are supported")]
    TooManyRays { count: usize },
}

/// Ordered set of rays cast every frame.
///
/// The first ray always points straight ahead. The order is also the order of
/// the policy feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VisionRay>", into = "Vec<VisionRay>")]
pub struct RayTable {
    rays: ArrayVec<VisionRay, MAX_RAYS>,
}

impl RayTable {
    pub fn new(rays: &[VisionRay]) -> Result<Self, RayTableError> {
        let first = rays.first().ok_or(RayTableError::Empty)?;
        if !first.is_straight_ahead() {
            return Err(RayTableError::FirstNotStraightAhead);
        }
        let count = rays.len();
        let rays = ArrayVec::try_from(rays).map_err(|_| RayTableError::TooManyRays { count })?;
        Ok(Self { rays })
    }

    #[must_use]
    pub fn rays(&self) -> &[VisionRay] {
        &self.rays
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    /// Length of the feature vector produced by readings of this table.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.rays.len() * FEATURES_PER_RAY
    }
}

impl Default for RayTable {
    /// Straight ahead, then symmetric pairs at 15°, 30°, 45°, 60° and 90°.
    ///
    /// The 90° pair is what lets an agent notice side openings when it has
    /// run into a dead end.
    fn default() -> Self {
        const ANGLES_AND_WEIGHTS: [(f64, f64); 6] = [
            (0.0, 1.0 / 2.0),
            (15.0, 1.0 / 5.0),
            (30.0, 1.0 / 6.0),
            (45.0, 1.0 / 6.0),
            (60.0, 1.0 / 7.0),
            (90.0, 1.0 / 7.0),
        ];
        let mut rays = ArrayVec::new();
        rays.push(VisionRay::from_degrees(0.0, ANGLES_AND_WEIGHTS[0].1));
        for (degrees, weight) in &ANGLES_AND_WEIGHTS[1..] {
            rays.push(VisionRay::from_degrees(-degrees, -weight));
            rays.push(VisionRay::from_degrees(*degrees, *weight));
        }
        Self { rays }
    }
}

impl TryFrom<Vec<VisionRay>> for RayTable {
    type Error = RayTableError;

    fn try_from(rays: Vec<VisionRay>) -> Result<Self, Self::Error> {
        Self::new(&rays)
    }
}

impl From<RayTable> for Vec<VisionRay> {
    fn from(table: RayTable) -> Self {
        table.rays.to_vec()
    }
}

/// What a single ray saw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayResult {
    pub angle: f64,
    pub weight: f64,
    /// Steps taken before hitting the first impassable pixel, or the last
    /// step when nothing was hit within the vision distance.
    pub wall_distance: u32,
    /// Steps that landed on a pixel with non-zero visited intensity.
    pub visited_count: u32,
    /// Sum of the visited intensities of those pixels.
    pub visited_intensity: u32,
    /// Pixel where the ray stopped.
    pub end: (i64, i64),
}

/// Ray results of one agent for one frame, in ray-table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReading(ArrayVec<RayResult, MAX_RAYS>);

impl SensorReading {
    #[must_use]
    pub fn rays(&self) -> &[RayResult] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The straight-ahead ray.
    #[must_use]
    pub fn straight_ahead(&self) -> Option<&RayResult> {
        self.0.first()
    }

    /// Flattened `(visited count, visited intensity, wall distance)` per ray.
    #[must_use]
    pub fn features(&self) -> ArrayVec<f64, MAX_FEATURES> {
        self.0
            .iter()
            .flat_map(|ray| {
                [
                    f64::from(ray.visited_count),
                    f64::from(ray.visited_intensity),
                    f64::from(ray.wall_distance),
                ]
            })
            .collect()
    }

    /// No ray within ±90° of heading sees further than one grid square.
    #[must_use]
    pub fn is_dead_end(&self, square_size: u32) -> bool {
        !self.0.iter().any(|ray| {
            ray.angle.abs() <= FRAC_PI_2 + HALF_TURN_EPSILON && ray.wall_distance > square_size
        })
    }
}

impl FromIterator<RayResult> for SensorReading {
    fn from_iter<T: IntoIterator<Item = RayResult>>(iter: T) -> Self {
        Self(iter.into_iter().take(MAX_RAYS).collect())
    }
}

/// Ray caster shared by every agent of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub rays: RayTable,
    /// Rays step at most `vision_distance - 1` pixels.
    pub vision_distance: u32,
}

impl Sensor {
    #[must_use]
    pub fn new(rays: RayTable, vision_distance: u32) -> Self {
        Self {
            rays,
            vision_distance,
        }
    }

    /// Casts every ray of the table from `position`.
    #[must_use]
    pub fn read(
        &self,
        maze: &Maze,
        memory: &VisitedMemory,
        position: Position,
        heading: f64,
    ) -> SensorReading {
        let origin = position.rounded();
        self.rays
            .rays()
            .iter()
            .map(|ray| self.cast(maze, memory, origin, heading, *ray))
            .collect()
    }

    /// Steps outward one pixel at a time along `heading + ray.angle`.
    ///
    /// The walk stops on the first impassable pixel (anything outside the
    /// maze counts as impassable) or after `vision_distance - 1` steps.
    /// Visited intensity is only accumulated over passable pixels.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn cast(
        &self,
        maze: &Maze,
        memory: &VisitedMemory,
        origin: (i64, i64),
        heading: f64,
        ray: VisionRay,
    ) -> RayResult {
        let direction = heading + ray.angle;
        let (dx, dy) = (direction.cos(), direction.sin());
        #[expect(clippy::cast_precision_loss)]
        let (ox, oy) = (origin.0 as f64, origin.1 as f64);

        let mut result = RayResult {
            angle: ray.angle,
            weight: ray.weight,
            wall_distance: 0,
            visited_count: 0,
            visited_intensity: 0,
            end: origin,
        };
        for step in 1..self.vision_distance {
            let distance = f64::from(step);
            let x = (ox + distance * dx).round() as i64;
            let y = (oy + distance * dy).round() as i64;
            result.wall_distance = step;
            result.end = (x, y);
            if !maze.pixels().is_passable(x, y) {
                break;
            }
            let intensity = memory.get(x, y);
            if intensity > 0 {
                result.visited_count += 1;
                result.visited_intensity += u32::from(intensity);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellGrid, Footprint};

    fn corridor(square: u32) -> Maze {
        let cells: CellGrid = "0 0 0 0 0 0 0\n0 1 1 1 1 1 0\n0 0 0 0 0 0 0\n"
            .parse()
            .unwrap();
        Maze::new(cells, square)
    }

    fn memory_for(maze: &Maze) -> VisitedMemory {
        VisitedMemory::new(maze.pixels().width(), maze.pixels().height())
    }

    #[test]
    fn test_default_table() {
        let table = RayTable::default();
        assert_eq!(table.len(), 11);
        assert_eq!(table.feature_count(), 33);
        assert!(table.rays()[0].is_straight_ahead());
        for pair in table.rays()[1..].chunks(2) {
            assert!((pair[0].angle + pair[1].angle).abs() < 1e-12);
            assert!((pair[0].weight + pair[1].weight).abs() < 1e-12);
            assert!(pair[0].angle < 0.0 && pair[0].weight < 0.0);
        }
        assert!((table.rays()[10].angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_table_validation() {
        assert_eq!(RayTable::new(&[]), Err(RayTableError::Empty));
        assert_eq!(
            RayTable::new(&[VisionRay::from_degrees(15.0, 0.2)]),
            Err(RayTableError::FirstNotStraightAhead)
        );
        let many = vec![VisionRay::from_degrees(0.0, 0.5); MAX_RAYS + 1];
        assert_eq!(
            RayTable::new(&many),
            Err(RayTableError::TooManyRays { count: 17 })
        );
    }

    #[test]
    fn test_table_serde_validates() {
        let json = r#"[{"angle": 0.0, "weight": 0.5}, {"angle": -0.5, "weight": -0.25}]"#;
        let table: RayTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rays()[1], VisionRay { angle: -0.5, weight: -0.25 });
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.starts_with('['));

        let bad = r#"[{"angle": 0.5, "weight": 1.0}]"#;
        assert!(serde_json::from_str::<RayTable>(bad).is_err());
    }

    #[test]
    fn test_corridor_wall_distance() {
        let maze = corridor(10);
        let memory = memory_for(&maze);
        let sensor = Sensor::new(RayTable::default(), 100);
        // passable pixels run x = 10..60; from x = 15 the wall is 45 steps away
        let ray = sensor.cast(&maze, &memory, (15, 15), 0.0, VisionRay::from_degrees(0.0, 0.5));
        assert_eq!(ray.wall_distance, 45);
        assert_eq!(ray.end, (60, 15));
        assert_eq!(ray.visited_count, 0);
        assert_eq!(ray.visited_intensity, 0);
    }

    #[test]
    fn test_vision_distance_caps_ray() {
        let maze = corridor(10);
        let memory = memory_for(&maze);
        let sensor = Sensor::new(RayTable::default(), 20);
        let ray = sensor.cast(&maze, &memory, (15, 15), 0.0, VisionRay::from_degrees(0.0, 0.5));
        assert_eq!(ray.wall_distance, 19);
        assert_eq!(ray.end, (34, 15));
    }

    #[test]
    fn test_ray_leaving_the_maze_stops() {
        let cells = CellGrid::filled(3, 3, crate::core::Cell::Passage);
        let maze = Maze::new(cells, 10);
        let memory = memory_for(&maze);
        let sensor = Sensor::new(RayTable::default(), 100);
        let ray = sensor.cast(&maze, &memory, (25, 15), 0.0, VisionRay::from_degrees(0.0, 0.5));
        assert_eq!(ray.wall_distance, 5);
        assert_eq!(ray.end, (30, 15));
    }

    #[test]
    fn test_ray_accumulates_visited_intensity() {
        let maze = corridor(10);
        let mut memory = memory_for(&maze);
        let footprint = Footprint::new(5, 9);
        // heading left puts the stamp centre 5 px right of (40, 15)
        memory.stamp(&footprint, Position::new(40.0, 15.0), std::f64::consts::PI);
        let sensor = Sensor::new(RayTable::default(), 100);
        let ray = sensor.cast(&maze, &memory, (15, 15), 0.0, VisionRay::from_degrees(0.0, 0.5));
        assert_eq!(ray.wall_distance, 45);
        // x = 41..=49 are stamped, 3 each except 6 at the centre
        assert_eq!(ray.visited_count, 9);
        assert_eq!(ray.visited_intensity, 8 * 3 + 6);
    }

    #[test]
    fn test_features_in_table_order() {
        let maze = corridor(10);
        let memory = memory_for(&maze);
        let sensor = Sensor::new(RayTable::default(), 20);
        let reading = sensor.read(&maze, &memory, Position::new(15.0, 15.0), 0.0);
        assert_eq!(reading.rays().len(), 11);
        let features = reading.features();
        assert_eq!(features.len(), 33);
        assert_eq!(features[0], 0.0);
        assert_eq!(features[1], 0.0);
        assert_eq!(features[2], 19.0);
        assert_eq!(reading.straight_ahead().unwrap().wall_distance, 19);
    }

    #[test]
    fn test_dead_end_detection() {
        let maze = corridor(10);
        let memory = memory_for(&maze);
        let sensor = Sensor::new(RayTable::default(), 20);
        // facing the open corridor
        let open = sensor.read(&maze, &memory, Position::new(15.0, 15.0), 0.0);
        assert!(!open.is_dead_end(10));
        // facing the closed end: every forward ray hits a wall within 10 px
        let closed = sensor.read(&maze, &memory, Position::new(15.0, 15.0), std::f64::consts::PI);
        assert!(closed.is_dead_end(10));
    }
}
