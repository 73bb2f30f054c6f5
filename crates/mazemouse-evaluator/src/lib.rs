//! Policies and multi-agent episodes for maze-running agents.
//!
//! This crate sits on top of [`mazemouse_engine`] and drives whole episodes:
//!
//! 1. **Policies** ([`policy`]) - Turn a sensor feature vector into a
//!    [`Control`](mazemouse_engine::Control): the reflex driver, a constant
//!    control and a linear feature-weight model.
//!
//! 2. **Episodes** ([`episode`]) - Step every hunting agent of a course once
//!    per frame, in parallel, until none is left hunting, and collect an
//!    [`AgentRecord`](episode::AgentRecord) for each.
//!
//! 3. **Run statistics** ([`run_stats`]) - Aggregate records across episodes:
//!    outcome totals, success streaks, success ratio and average frames.
//!
//! # Architecture
//!
//! ```text
//! RunStats (across episodes)
//!     ↑ records
//! Episode (one course, many agents, frame loop)
//!     ↓ asks
//! Policy (one decision per agent per frame)
//! ```

pub mod episode;
pub mod policy;
pub mod run_stats;
