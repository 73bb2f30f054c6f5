use std::{f64::consts::PI, fmt, sync::Arc};

use serde::{Serialize, Serializer};

use super::{AgentParams, Control, Course, Policy, SensorReading, steering};
use crate::core::{Footprint, Maze, Position, VisitedMemory};

/// Heading agents start with unless the caller picks one, in radians.
pub const DEFAULT_HEADING: f64 = PI / 6.0;

/// Score given to agents that spin out.
pub const SPUN_OUT_SCORE: f64 = -1.0;

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Outcome {
    #[display("SUCCESSFUL")]
    Successful,
    #[display("CRASHED")]
    Crashed,
    #[display("TIMEDOUT")]
    TimedOut,
    #[display("SPUNOUT")]
    SpunOut,
}

impl Outcome {
    pub const ALL: [Self; 4] = [Self::Successful, Self::Crashed, Self::TimedOut, Self::SpunOut];
}

/// Agent lifecycle. `Finished` is terminal: nothing leaves it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum AgentStatus {
    #[default]
    Hunting,
    Finished(Outcome),
}

impl AgentStatus {
    #[must_use]
    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Hunting => None,
            Self::Finished(outcome) => Some(outcome),
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hunting => f.write_str("HUNTING"),
            Self::Finished(outcome) => fmt::Display::fmt(outcome, f),
        }
    }
}

impl Serialize for AgentStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A single maze-running agent.
///
/// Each agent owns its kinematic state and its [`VisitedMemory`]; the
/// [`Course`] it runs on is only ever read. Call [`step`](Self::step) once per
/// frame until the status is no longer hunting.
#[derive(Debug, Clone)]
pub struct Agent {
    params: Arc<AgentParams>,
    footprint: Footprint,
    memory: VisitedMemory,
    reading: SensorReading,
    position: Position,
    heading: f64,
    speed: f64,
    steering: f64,
    distance_travelled: f64,
    frames: u32,
    best_progress: u32,
    status: AgentStatus,
    score: f64,
}

impl Agent {
    #[must_use]
    pub fn new(params: Arc<AgentParams>, maze: &Maze, position: Position, heading: f64) -> Self {
        let footprint = Footprint::new(params.visited_path_radius, params.trail_intensity);
        let memory = VisitedMemory::new(maze.pixels().width(), maze.pixels().height());
        let speed = params.initial_speed;
        Self {
            params,
            footprint,
            memory,
            reading: SensorReading::default(),
            position,
            heading,
            speed,
            steering: 0.0,
            distance_travelled: 0.0,
            frames: 0,
            best_progress: 0,
            status: AgentStatus::Hunting,
            score: 0.0,
        }
    }

    /// An agent at the centre of the entrance cell.
    #[must_use]
    pub fn at_entrance(params: Arc<AgentParams>, maze: &Maze, heading: f64) -> Self {
        Self::new(params, maze, maze.start_position(), heading)
    }

    #[must_use]
    pub fn params(&self) -> &Arc<AgentParams> {
        &self.params
    }

    #[must_use]
    pub fn memory(&self) -> &VisitedMemory {
        &self.memory
    }

    /// The last sensor reading, empty before the first step.
    #[must_use]
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Accumulated heading in radians. Not wrapped into `-PI..PI`.
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub const fn steering(&self) -> f64 {
        self.steering
    }

    #[must_use]
    pub const fn distance_travelled(&self) -> f64 {
        self.distance_travelled
    }

    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// Highest progress-field value reached so far.
    #[must_use]
    pub const fn best_progress(&self) -> u32 {
        self.best_progress
    }

    #[must_use]
    pub const fn status(&self) -> AgentStatus {
        self.status
    }

    /// Terminal score, 0 while hunting.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Runs one frame: validate position, sense, ask `policy`, move.
    ///
    /// Does nothing once the agent has finished.
    pub fn step<P>(&mut self, course: &Course, policy: &mut P)
    where
        P: Policy + ?Sized,
    {
        if !self.status.is_hunting() {
            return;
        }
        if !course.maze().is_passable_at(self.position) {
            self.finish(Outcome::Crashed, course);
            return;
        }
        self.reading =
            self.params
                .sensor
                .read(course.maze(), &self.memory, self.position, self.heading);
        let control = policy.decide(&self.reading.features());
        self.advance(course, control);
    }

    fn advance(&mut self, course: &Course, control: Control) {
        let params = Arc::clone(&self.params);
        let maze = course.maze();

        let reflex = steering::reflex_steering(
            &self.reading,
            maze.square_size(),
            params.steering_multiplier,
            params.visited_path_avoidance_factor,
        );
        let steering = params
            .limits
            .clamp_steering(reflex + control.steering_delta, self.steering);
        let acceleration = params.limits.clamp_acceleration(control.speed_delta);
        let speed = (self.speed + acceleration)
            .max(params.speed_min)
            .min(params.speed_max);

        self.frames += 1;
        self.steering = steering;
        self.heading += steering;
        self.speed = speed;
        self.position = self.position.advanced(self.heading, speed);
        self.distance_travelled += speed;

        self.memory
            .stamp(&self.footprint, self.position, self.heading);
        if self.frames % params.frames_between_fades.max(1) == 0 {
            self.memory.fade();
        }

        self.best_progress = self.best_progress.max(course.progress_at(self.position));

        if self.distance_travelled > params.max_distance {
            self.finish(Outcome::TimedOut, course);
        } else if maze.is_at_exit(self.position) {
            self.finish(Outcome::Successful, course);
        } else if params.limits.is_spun_out(self.heading) {
            self.finish(Outcome::SpunOut, course);
        }
    }

    /// The only transition out of [`AgentStatus::Hunting`].
    fn finish(&mut self, outcome: Outcome, course: &Course) {
        let AgentStatus::Hunting = self.status else {
            return;
        };
        self.status = AgentStatus::Finished(outcome);

        let path_length = course.solution().path_length();
        self.score = match outcome {
            Outcome::Successful => {
                1000.0 * f64::from(path_length) * f64::from(course.maze().square_size())
                    / f64::from(self.frames.max(1))
            }
            Outcome::SpunOut => SPUN_OUT_SCORE,
            Outcome::Crashed | Outcome::TimedOut if path_length == 0 => 0.0,
            Outcome::Crashed | Outcome::TimedOut => {
                100.0 * f64::from(self.best_progress.min(path_length)) / f64::from(path_length)
            }
        };
        tracing::debug!(
            status = %self.status,
            frames = self.frames,
            distance = self.distance_travelled,
            best_progress = self.best_progress,
            score = self.score,
            "agent finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cell, CellGrid, CellPos};

    fn straight_corridor(cols: usize, square: u32) -> Course {
        let mut cells = CellGrid::filled(3, cols, Cell::Wall);
        for col in 1..cols - 1 {
            cells.set(CellPos::new(1, col), Cell::Passage);
        }
        Course::new(Maze::new(cells, square))
    }

    /// One grid square per frame and no reflex steering.
    fn fixed_speed_params(course: &Course) -> AgentParams {
        let square = course.maze().square_size();
        let cells = course.maze().cells();
        let mut params = AgentParams::for_maze(cells.rows(), cells.cols(), square);
        params.speed_min = f64::from(square);
        params.speed_max = f64::from(square);
        params.initial_speed = f64::from(square);
        params.steering_multiplier = 0.0;
        params.max_distance = 1e9;
        params
    }

    fn idle(_: &[f64]) -> Control {
        Control::default()
    }

    #[test]
    fn test_corridor_run_is_successful() {
        let course = straight_corridor(21, 10);
        assert_eq!(course.solution().path_length(), 18);
        let params = fixed_speed_params(&course).into_shared();
        let mut agent = Agent::at_entrance(params, course.maze(), 0.0);
        let mut policy = idle;

        while agent.status().is_hunting() {
            agent.step(&course, &mut policy);
            assert!(agent.frames() <= 18);
        }
        assert_eq!(agent.status(), AgentStatus::Finished(Outcome::Successful));
        assert_eq!(agent.frames(), 18);
        assert_eq!(course.maze().cell_at(agent.position()), Some(CellPos::new(1, 19)));
        assert!((agent.score() - 1000.0 * 18.0 * 10.0 / 18.0).abs() < 1e-9);
        assert!((agent.distance_travelled() - 180.0).abs() < 1e-9);
        // the exit cell holds path length + 1
        assert_eq!(agent.best_progress(), 19);
        assert_eq!(agent.reading().rays().len(), 11);
    }

    #[test]
    fn test_start_on_wall_crashes_immediately() {
        let course = straight_corridor(7, 10);
        let params = fixed_speed_params(&course).into_shared();
        let mut agent = Agent::new(params, course.maze(), Position::new(5.0, 5.0), 0.0);
        let mut calls = 0;
        let mut policy = |_: &[f64]| {
            calls += 1;
            Control::default()
        };
        agent.step(&course, &mut policy);
        assert_eq!(agent.status(), AgentStatus::Finished(Outcome::Crashed));
        assert_eq!(agent.score(), 0.0);
        assert_eq!(agent.frames(), 0);
        assert!(agent.reading().is_empty());

        // finished agents ignore further steps
        agent.step(&course, &mut policy);
        assert_eq!(calls, 0);
        assert_eq!(agent.status().to_string(), "CRASHED");
    }

    #[test]
    fn test_crash_scores_partial_progress() {
        // a shallow heading runs the agent into the lower wall of the corridor
        let course = straight_corridor(9, 10);
        let mut params = fixed_speed_params(&course);
        params.sensor.vision_distance = 2;
        let mut agent = Agent::at_entrance(params.into_shared(), course.maze(), 0.0);
        let mut policy = idle;
        agent.heading = 0.2;
        while agent.status().is_hunting() {
            agent.step(&course, &mut policy);
        }
        assert_eq!(agent.status(), AgentStatus::Finished(Outcome::Crashed));
        assert_eq!(agent.frames(), 3);
        assert_eq!(agent.best_progress(), 3);
        assert!((agent.score() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_timeout() {
        let course = straight_corridor(21, 10);
        let params = fixed_speed_params(&course).with_max_distance(25.0);
        let mut agent = Agent::at_entrance(params.into_shared(), course.maze(), 0.0);
        let mut policy = idle;
        while agent.status().is_hunting() {
            agent.step(&course, &mut policy);
        }
        assert_eq!(agent.status(), AgentStatus::Finished(Outcome::TimedOut));
        assert_eq!(agent.frames(), 3);
        // reached cell (1, 4)
        assert_eq!(agent.best_progress(), 4);
        assert!((agent.score() - 100.0 * 4.0 / 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_spin_out() {
        let course = straight_corridor(21, 10);
        let mut params = fixed_speed_params(&course);
        params.limits.spin_threshold = 0.05;
        let mut agent = Agent::at_entrance(params.into_shared(), course.maze(), 0.0);
        let mut policy = |_: &[f64]| Control::new(0.1, 0.0);
        agent.step(&course, &mut policy);
        assert_eq!(agent.status(), AgentStatus::Finished(Outcome::SpunOut));
        assert_eq!(agent.score(), SPUN_OUT_SCORE);
    }

    #[test]
    fn test_policy_steering_is_rate_limited() {
        let course = straight_corridor(21, 10);
        let params = fixed_speed_params(&course).into_shared();
        let limit = params.limits.steering_delta_max;
        let mut agent = Agent::at_entrance(params, course.maze(), 0.0);
        let mut policy = |_: &[f64]| Control::new(10.0 * limit, 0.0);
        agent.step(&course, &mut policy);
        assert_eq!(agent.steering(), limit);
        assert_eq!(agent.heading(), limit);
    }

    #[test]
    fn test_speed_clamped_by_acceleration_and_bounds() {
        let course = straight_corridor(21, 70);
        let cells = course.maze().cells();
        let params = AgentParams::for_maze(cells.rows(), cells.cols(), 70).into_shared();
        let mut agent = Agent::at_entrance(params, course.maze(), 0.0);
        assert!((agent.speed() - 1.4).abs() < 1e-12);

        let mut flat_out = |_: &[f64]| Control::new(0.0, 100.0);
        agent.step(&course, &mut flat_out);
        // 1.4 + 2 (acceleration cap)
        assert!((agent.speed() - 3.4).abs() < 1e-12);
        agent.step(&course, &mut flat_out);
        assert_eq!(agent.speed(), 5.0);

        let mut brake = |_: &[f64]| Control::new(0.0, -100.0);
        agent.step(&course, &mut brake);
        assert_eq!(agent.speed(), 2.0);
    }

    #[test]
    fn test_trail_is_laid_and_faded() {
        let course = straight_corridor(21, 10);
        let mut params = fixed_speed_params(&course);
        params.visited_path_radius = 5;
        params.frames_between_fades = 1;
        let mut agent = Agent::at_entrance(params.into_shared(), course.maze(), 0.0);
        let mut policy = idle;
        agent.step(&course, &mut policy);
        // stamped 5 px behind (25, 15) at full intensity, then faded once
        assert_eq!(agent.memory().get(20, 15), 6 - 1);
        assert!(agent.memory().total() > 0);
    }

    #[test]
    fn test_status_display_and_serialize() {
        assert_eq!(AgentStatus::Hunting.to_string(), "HUNTING");
        assert_eq!(
            serde_json::to_string(&AgentStatus::Finished(Outcome::TimedOut)).unwrap(),
            "\"TIMEDOUT\""
        );
        assert_eq!(AgentStatus::Finished(Outcome::SpunOut).outcome(), Some(Outcome::SpunOut));
        assert_eq!(AgentStatus::Hunting.outcome(), None);
    }
}
