//! Multi-agent episodes.
//!
//! An [`Episode`] runs many agents on one shared [`Course`]. Each frame every
//! hunting agent senses, asks its own policy and moves. Agents never touch
//! each other's state, so a frame is split across scoped threads and joined
//! before the next frame starts; decisions for frame `n` never see state from
//! frame `n + 1`.

use std::{num::NonZero, thread};

use mazemouse_engine::{Agent, AgentStatus, Course, Outcome, Policy};
use serde::Serialize;

/// What the stats collaborator receives for each finished agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRecord {
    pub frames: u32,
    pub distance_travelled: f64,
    pub path_length: u32,
    pub best_progress: u32,
    pub status: AgentStatus,
    pub score: f64,
}

impl AgentRecord {
    #[must_use]
    pub fn new(agent: &Agent, course: &Course) -> Self {
        Self {
            frames: agent.frames(),
            distance_travelled: agent.distance_travelled(),
            path_length: course.solution().path_length(),
            best_progress: agent.best_progress(),
            status: agent.status(),
            score: agent.score(),
        }
    }
}

/// Result of a finished [`Episode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// Frames until the last agent finished.
    pub frames: u32,
    pub path_length: u32,
    pub records: Vec<AgentRecord>,
}

impl EpisodeSummary {
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == AgentStatus::Finished(outcome))
            .count()
    }

    /// Highest score of the episode.
    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.records.iter().map(|r| r.score).reduce(f64::max)
    }
}

struct Slot {
    agent: Agent,
    policy: Box<dyn Policy + Send>,
}

/// Agents running on one course, stepped frame by frame.
pub struct Episode<'a> {
    course: &'a Course,
    slots: Vec<Slot>,
    frame: u32,
    threads: usize,
}

impl<'a> Episode<'a> {
    #[must_use]
    pub fn new(course: &'a Course) -> Self {
        let threads = thread::available_parallelism().map_or(1, NonZero::get);
        Self {
            course,
            slots: vec![],
            frame: 0,
            threads,
        }
    }

    /// Caps the number of worker threads per frame.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn add_agent<P>(&mut self, agent: Agent, policy: P)
    where
        P: Policy + Send + 'static,
    {
        self.slots.push(Slot {
            agent,
            policy: Box::new(policy),
        });
    }

    #[must_use]
    pub fn course(&self) -> &'a Course {
        self.course
    }

    #[must_use]
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.slots.iter().map(|slot| &slot.agent)
    }

    #[must_use]
    pub fn hunting_count(&self) -> usize {
        self.agents().filter(|a| a.status().is_hunting()).count()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.hunting_count() == 0
    }

    /// Steps every agent once and returns how many are still hunting.
    pub fn step_frame(&mut self) -> usize {
        let course = self.course;
        let chunk_size = self.slots.len().div_ceil(self.threads).max(1);
        if self.threads == 1 || self.slots.len() <= 1 {
            for slot in &mut self.slots {
                slot.agent.step(course, slot.policy.as_mut());
            }
        } else {
            thread::scope(|s| {
                for chunk in self.slots.chunks_mut(chunk_size) {
                    s.spawn(move || {
                        for slot in chunk {
                            slot.agent.step(course, slot.policy.as_mut());
                        }
                    });
                }
            });
        }
        self.frame += 1;
        self.hunting_count()
    }

    /// Steps frames until no agent is hunting.
    ///
    /// Every agent finishes eventually: speed is at least one pixel per frame,
    /// so the distance budget runs out even if nothing else happens.
    #[must_use]
    pub fn run(mut self) -> EpisodeSummary {
        while !self.is_finished() {
            self.step_frame();
        }
        let summary = self.summary();
        tracing::debug!(
            frames = summary.frames,
            agents = summary.records.len(),
            successful = summary.count(Outcome::Successful),
            "episode finished"
        );
        summary
    }

    #[must_use]
    pub fn summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            frames: self.frame,
            path_length: self.course.solution().path_length(),
            records: self
                .agents()
                .map(|agent| AgentRecord::new(agent, self.course))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use mazemouse_engine::{AgentParams, CellGrid, Control, Maze, MazeGenerator, MazeSeed};

    use super::*;
    use crate::policy::{ConstantPolicy, ReflexPolicy};

    fn corridor() -> Course {
        let cells: CellGrid = "0 0 0 0 0 0 0 0 0\n0 1 1 1 1 1 1 1 0\n0 0 0 0 0 0 0 0 0\n"
            .parse()
            .unwrap();
        Course::new(Maze::new(cells, 10))
    }

    fn fast_params(course: &Course) -> AgentParams {
        let cells = course.maze().cells();
        let mut params = AgentParams::for_maze(cells.rows(), cells.cols(), 10);
        params.speed_min = 10.0;
        params.speed_max = 10.0;
        params.initial_speed = 10.0;
        params.steering_multiplier = 0.0;
        params
    }

    #[test]
    fn test_parallel_episode_matches_sequential() {
        let course = corridor();
        let params = fast_params(&course).into_shared();

        let build = |threads| {
            let mut episode = Episode::new(&course).with_threads(threads);
            for i in 0..8 {
                let agent = Agent::at_entrance(params.clone(), course.maze(), 0.0);
                // half of the agents crash into the first wall they face
                let heading_push = if i % 2 == 0 { 0.0 } else { 0.5 };
                episode.add_agent(agent, ConstantPolicy(Control::new(heading_push, 0.0)));
            }
            episode
        };
        let parallel = build(4).run();
        let sequential = build(1).run();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.records.len(), 8);
        assert_eq!(parallel.count(Outcome::Successful), 4);
        assert_eq!(parallel.count(Outcome::Crashed), 4);
        assert_eq!(parallel.path_length, 6);
    }

    #[test]
    fn test_successful_records() {
        let course = corridor();
        let params = fast_params(&course).into_shared();
        let mut episode = Episode::new(&course);
        episode.add_agent(
            Agent::at_entrance(params, course.maze(), 0.0),
            ConstantPolicy::default(),
        );
        assert_eq!(episode.hunting_count(), 1);
        let summary = episode.run();
        assert_eq!(summary.frames, 6);
        let record = &summary.records[0];
        assert_eq!(record.status, AgentStatus::Finished(Outcome::Successful));
        assert_eq!(record.frames, 6);
        assert_eq!(record.path_length, 6);
        assert!((record.score - 1000.0 * 6.0 * 10.0 / 6.0).abs() < 1e-9);
        assert_eq!(summary.best_score(), Some(record.score));

        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["status"], "SUCCESSFUL");
    }

    #[test]
    fn test_generated_maze_episode_terminates() {
        let seed: MazeSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
        let cells = MazeGenerator::with_seed(seed).generate(9, 11);
        let course = Course::new(Maze::new(cells, 30));
        let params = AgentParams::for_maze(9, 11, 30).into_shared();
        let mut episode = Episode::new(&course);
        for heading in [-1.0, 0.0, 0.5, 1.0] {
            let agent = Agent::at_entrance(params.clone(), course.maze(), heading);
            episode.add_agent(agent, ReflexPolicy::for_params(&params));
        }
        let summary = episode.run();
        assert!(summary.frames > 0);
        assert!(summary.records.iter().all(|r| r.status.is_finished()));
        let total: usize = Outcome::ALL.iter().map(|o| summary.count(*o)).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_empty_episode_is_finished() {
        let course = corridor();
        let episode = Episode::new(&course);
        assert!(episode.is_finished());
        let summary = episode.run();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.best_score(), None);
    }
}
