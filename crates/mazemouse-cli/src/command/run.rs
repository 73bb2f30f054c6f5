use std::{
    f64::consts::PI,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use mazemouse_engine::{
    Agent, CellGrid, Course, Maze, MazeGenerator, MazeSeed, Outcome, normalize_dimension,
};
use mazemouse_evaluator::{
    episode::{Episode, EpisodeSummary},
    policy::{ConstantPolicy, LinearPolicy, LinearWeights, ReflexPolicy},
    run_stats::RunStats,
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    config::{PolicyKind, SimulationConfig},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// Simulation config JSON file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of maze rows
    #[arg(long)]
    rows: Option<usize>,
    /// Number of maze columns
    #[arg(long)]
    cols: Option<usize>,
    /// Square size in pixels
    #[arg(long)]
    square_size: Option<u32>,
    /// Number of agents per episode
    #[arg(long)]
    agents: Option<usize>,
    /// Number of episodes
    #[arg(long)]
    episodes: Option<u32>,
    /// Standard deviation of the per-agent parameter noise
    #[arg(long)]
    jitter: Option<f64>,
    /// Driver of every agent
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,
    /// Linear policy weights JSON file
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Directory for mazes no agent solved
    #[arg(long)]
    failed_maze_dir: Option<PathBuf>,
    /// Run every episode on this maze file instead of generating mazes
    #[arg(long)]
    maze: Option<PathBuf>,
    /// Seed of the run; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads per frame; all available cores when omitted
    #[arg(long)]
    threads: Option<usize>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl RunArg {
    fn load_config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config: SimulationConfig = match &self.config {
            Some(path) => util::read_json_file("simulation config", path)?,
            None => SimulationConfig::default(),
        };
        if let Some(v) = self.rows {
            config.rows = v;
        }
        if let Some(v) = self.cols {
            config.cols = v;
        }
        if let Some(v) = self.square_size {
            config.square_size = v;
        }
        if let Some(v) = self.agents {
            config.agents = v;
        }
        if let Some(v) = self.episodes {
            config.episodes = v;
        }
        if let Some(v) = self.jitter {
            config.parameter_jitter = v;
        }
        if let Some(v) = self.policy {
            config.policy = v;
        }
        if let Some(v) = &self.weights {
            config.weights = Some(v.clone());
        }
        if let Some(v) = &self.failed_maze_dir {
            config.failed_maze_dir = Some(v.clone());
        }
        anyhow::ensure!(config.square_size > 0, "square size must be positive");
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct EpisodeReport {
    episode: u32,
    /// Seed of the generated maze; absent for mazes loaded from a file.
    seed: Option<MazeSeed>,
    rows: usize,
    cols: usize,
    heading: f64,
    max_distance: f64,
    #[serde(flatten)]
    summary: EpisodeSummary,
    saved_maze: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    config: SimulationConfig,
    /// Episodes dropped because their maze had no solution.
    skipped: u32,
    episodes: Vec<EpisodeReport>,
    stats: RunStats,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let config = arg.load_config()?;
    let fixed_maze = arg.maze.as_deref().map(util::read_maze_file).transpose()?;
    let mut rng = match arg.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    let simulation = Simulation::new(config, fixed_maze, arg.threads)?;
    let report = simulation.run(&mut rng)?;
    tracing::info!(
        runs = report.stats.total_runs,
        successes = report.stats.successes,
        max_success_streak = report.stats.max_success_streak,
        success_ratio = report.stats.success_ratio(),
        average_frames = report.stats.average_frames(),
        "run finished"
    );
    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}

struct Simulation {
    config: SimulationConfig,
    fixed_maze: Option<CellGrid>,
    weights: Option<LinearWeights>,
    threads: Option<usize>,
}

impl Simulation {
    fn new(
        config: SimulationConfig,
        fixed_maze: Option<CellGrid>,
        threads: Option<usize>,
    ) -> anyhow::Result<Self> {
        let weights = match (&config.weights, config.policy) {
            (Some(path), PolicyKind::Linear) => Some(util::read_json_file("weights", path)?),
            _ => None,
        };
        Ok(Self {
            config,
            fixed_maze,
            weights,
            threads,
        })
    }

    fn run<R>(self, rng: &mut R) -> anyhow::Result<RunReport>
    where
        R: Rng + ?Sized,
    {
        let mut stats = RunStats::new();
        let mut episodes = vec![];
        let mut skipped = 0;
        for number in 1..=self.config.episodes {
            let (seed, grid) = match &self.fixed_maze {
                Some(grid) => (None, grid.clone()),
                None => {
                    let seed: MazeSeed = rng.random();
                    let grid = MazeGenerator::with_seed(seed).generate(
                        normalize_dimension(self.config.rows),
                        normalize_dimension(self.config.cols),
                    );
                    (Some(seed), grid)
                }
            };
            let course = Course::new(Maze::new(grid, self.config.square_size));
            if !course.is_solved() {
                tracing::warn!(episode = number, ?seed, "maze has no solution, skipping");
                skipped += 1;
                continue;
            }

            let report = self.run_episode(number, seed, &course, rng)?;
            stats.record_episode(&report.summary);
            tracing::info!(
                episode = number,
                path_length = report.summary.path_length,
                frames = report.summary.frames,
                successes = report.summary.count(Outcome::Successful),
                success_streak = stats.success_streak,
                "episode finished"
            );
            episodes.push(report);
        }
        Ok(RunReport {
            config: self.config,
            skipped,
            episodes,
            stats,
        })
    }

    fn run_episode<R>(
        &self,
        number: u32,
        seed: Option<MazeSeed>,
        course: &Course,
        rng: &mut R,
    ) -> anyhow::Result<EpisodeReport>
    where
        R: Rng + ?Sized,
    {
        let cells = course.maze().cells();
        let (rows, cols) = (cells.rows(), cells.cols());
        let base = self.config.agent_params(rows, cols, number);
        // every agent of an episode leaves the entrance facing the same way
        let heading = rng.random_range(-PI..PI);

        let mut episode = Episode::new(course);
        if let Some(threads) = self.threads {
            episode = episode.with_threads(threads);
        }
        for _ in 0..self.config.agents {
            let params = base.perturbed(rng, self.config.parameter_jitter).into_shared();
            let agent = Agent::at_entrance(params.clone(), course.maze(), heading);
            match self.config.policy {
                PolicyKind::Reflex => episode.add_agent(agent, ReflexPolicy::for_params(&params)),
                PolicyKind::Constant => episode.add_agent(agent, ConstantPolicy::default()),
                PolicyKind::Linear => {
                    let weights = self.weights.clone().unwrap_or_else(|| {
                        LinearWeights::random(rng, params.sensor.rays.feature_count())
                    });
                    let policy = LinearPolicy::new(weights, &params)
                        .context("Linear policy weights do not fit the ray table")?;
                    episode.add_agent(agent, policy);
                }
            }
        }

        let summary = episode.run();
        let saved_maze = match &self.config.failed_maze_dir {
            Some(dir) if summary.count(Outcome::Successful) == 0 && !summary.records.is_empty() => {
                Some(save_failed(dir, course, &summary)?)
            }
            _ => None,
        };
        Ok(EpisodeReport {
            episode: number,
            seed,
            rows,
            cols,
            heading,
            max_distance: base.max_distance,
            summary,
            saved_maze,
        })
    }
}

/// Outcome of the best scoring agent, the reason a failed maze is saved under.
fn failure_reason(summary: &EpisodeSummary) -> Outcome {
    summary
        .records
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .and_then(|record| record.status.outcome())
        .unwrap_or(Outcome::Crashed)
}

fn save_failed(dir: &Path, course: &Course, summary: &EpisodeSummary) -> anyhow::Result<PathBuf> {
    let reason = failure_reason(summary);
    let path = util::save_failed_maze(dir, course.maze().cells(), reason, summary.path_length)?;
    tracing::warn!(%reason, path = %path.display(), "no agent solved the maze, saved");
    Ok(path)
}
