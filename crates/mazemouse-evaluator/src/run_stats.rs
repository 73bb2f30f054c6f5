//! Statistics across episodes.

use mazemouse_engine::{AgentStatus, Outcome};
use serde::Serialize;

use crate::episode::{AgentRecord, EpisodeSummary};

/// Running totals over every finished agent run.
///
/// A run is one agent on one maze. A success extends the current streak of
/// successes; any other outcome ends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total_runs: u64,
    pub successes: u64,
    pub crashed: u64,
    pub timed_out: u64,
    pub spun_out: u64,
    pub success_streak: u64,
    pub max_success_streak: u64,
    pub total_frames: u64,
}

impl RunStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one finished run. Records of agents still hunting are ignored.
    pub fn record(&mut self, record: &AgentRecord) {
        let AgentStatus::Finished(outcome) = record.status else {
            return;
        };
        self.total_runs += 1;
        self.total_frames += u64::from(record.frames);
        match outcome {
            Outcome::Successful => {
                self.successes += 1;
                self.success_streak += 1;
                self.max_success_streak = self.max_success_streak.max(self.success_streak);
            }
            Outcome::Crashed => self.crashed += 1,
            Outcome::TimedOut => self.timed_out += 1,
            Outcome::SpunOut => self.spun_out += 1,
        }
        if !outcome.is_successful() {
            self.success_streak = 0;
        }
    }

    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        for record in &summary.records {
            self.record(record);
        }
    }

    /// Successes over total runs, 0 before the first run.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn success_ratio(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            self.successes as f64 / self.total_runs as f64
        }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average_frames(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            self.total_frames as f64 / self.total_runs as f64
        }
    }
}
