//! Train command - Train the Q-learning agent in the castle environment

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;
use tracing::info;

use crate::{
    castle::{EnvConfig, GridEnvironment},
    cli::{
        config::{AgentArgs, EnvArgs},
        output::{format_number, format_percent, print_kv, print_section},
    },
    pipeline::{
        CsvObserver, EpisodeSummary, LogObserver, MetricsObserver, MetricsSummary,
        MilestoneObserver, MilestoneSummary, ProgressObserver, TrainingConfig, TrainingPipeline,
        TrainingResult,
    },
    ports::Observer,
    q_learning::{AgentConfig, LoadStatus, QLearningAgent},
};

#[derive(Parser, Debug)]
#[command(about = "Train the Q-learning agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 5000)]
    pub episodes: usize,

    /// Driver-side step limit per episode
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,

    /// Seed for the exploration RNG
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop once an episode's total reward exceeds this
    #[arg(long, default_value_t = 5000.0)]
    pub solve_threshold: f64,

    /// Never stop early
    #[arg(long, default_value_t = false)]
    pub no_early_stop: bool,

    /// Value table file; rewritten on every new best episode
    #[arg(long, short = 'O', default_value = "q_table.msgpack")]
    pub checkpoint: PathBuf,

    /// Start from the table already stored at the checkpoint path
    #[arg(long, default_value_t = false)]
    pub resume: bool,

    /// Optional per-episode history CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Log a progress line every N episodes
    #[arg(long, default_value_t = 5)]
    pub log_every: usize,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    #[command(flatten)]
    pub env: EnvArgs,

    #[command(flatten)]
    pub agent: AgentArgs,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    env: &'a EnvConfig,
    agent: &'a AgentConfig,
    training: &'a TrainingConfig,
    resumed_entries: Option<usize>,
    episodes_run: usize,
    best_reward: f64,
    best_episode: Option<usize>,
    solved_at: Option<usize>,
    final_epsilon: f64,
    table_size: usize,
    metrics: MetricsSummary,
    milestones: MilestoneSummary,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Trailing separator or no file name: treat as a directory
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let env_config = args.env.to_env_config()?;
    let agent_config = args.agent.to_agent_config()?;
    let training_config = TrainingConfig {
        episodes: args.episodes,
        max_steps_per_episode: args.max_steps,
        seed: args.seed,
        solve_threshold: (!args.no_early_stop).then_some(args.solve_threshold),
        checkpoint: Some(args.checkpoint.clone()),
    };

    let mut env = GridEnvironment::new(env_config.clone())?;
    let mut agent = QLearningAgent::new(agent_config)?;

    let resumed_entries = if args.resume {
        match agent.load_table(&args.checkpoint) {
            LoadStatus::Loaded { entries } => Some(entries),
            LoadStatus::Missing | LoadStatus::Corrupt { .. } => None,
        }
    } else {
        None
    };

    let metrics_handle = Shared::<MetricsObserver>::default();
    let milestones_handle = Shared::<MilestoneObserver>::default();

    let mut pipeline = TrainingPipeline::new(training_config.clone())
        .with_observer(Box::new(LogObserver::new(args.log_every)))
        .with_observer(Box::new(metrics_handle.clone()))
        .with_observer(Box::new(milestones_handle.clone()));
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.csv {
        pipeline = pipeline.with_observer(Box::new(CsvObserver::new(path)?));
    }

    info!(
        episodes = training_config.episodes,
        grid_size = env_config.grid_size,
        "starting training"
    );
    let result = pipeline.run(&mut env, &mut agent)?;

    let metrics = metrics_handle.read(MetricsObserver::summary);
    let milestones = milestones_handle.read(MilestoneObserver::summary);
    print_report(&result, &metrics, &milestones, resumed_entries);
    print_kv("Table file", &args.checkpoint.display().to_string());

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let summary = TrainingSummaryFile {
            env: &env_config,
            agent: &agent_config,
            training: &training_config,
            resumed_entries,
            episodes_run: result.episodes_run,
            best_reward: result.best_reward,
            best_episode: result.best_episode,
            solved_at: result.solved_at,
            final_epsilon: result.final_epsilon,
            table_size: result.table_size,
            metrics,
            milestones,
        };
        to_writer_pretty(File::create(&path)?, &summary)?;
        print_kv("Summary", &path.display().to_string());
    }

    Ok(())
}

fn print_report(
    result: &TrainingResult,
    metrics: &MetricsSummary,
    milestones: &MilestoneSummary,
    resumed: Option<usize>,
) {
    print_section("Training Complete");
    if let Some(entries) = resumed {
        print_kv("Resumed entries", &format_number(entries));
    }
    print_kv("Episodes", &format_number(result.episodes_run));
    print_kv("Best reward", &format!("{:.1}", result.best_reward));
    if let Some(episode) = result.best_episode {
        print_kv("Best episode", &format_number(episode + 1));
    }
    match result.solved_at {
        Some(episode) => print_kv("Solved at", &format_number(episode + 1)),
        None => print_kv("Solved at", "not solved"),
    }
    print_kv("Escape rate", &format_percent(metrics.escape_rate));
    print_kv("Wrong order rate", &format_percent(metrics.wrong_order_rate));
    if let Some(episode) = milestones.first_escape {
        print_kv("First escape", &format_number(episode + 1));
    }
    if let Some(episode) = milestones.last_wrong_order {
        print_kv("Last wrong order", &format_number(episode + 1));
    }
    print_kv(
        "Order learned",
        if milestones.order_learned { "yes" } else { "no" },
    );
    print_kv(
        "Recent mean (100)",
        &format!("{:.1}", result.recent_mean_reward(100)),
    );
    print_kv("Final epsilon", &format!("{:.4}", result.final_epsilon));
    print_kv("Table entries", &format_number(result.table_size));
}

/// Observer shared between the pipeline and the final report
///
/// Only episode ends are forwarded.
struct Shared<T>(Arc<Mutex<T>>);

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(T::default())))
    }
}

impl<T> Shared<T> {
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }
}

impl<T: Observer> Observer for Shared<T> {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> crate::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_episode_end(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_observer_reports_milestones() {
        let handle = Shared::<MilestoneObserver>::default();
        let mut pipeline_side = handle.clone();
        let escaped = EpisodeSummary {
            episode: 4,
            total_reward: 7000.0,
            steps: 30,
            outcome: crate::castle::Outcome::Escaped,
            kills: 3,
            epsilon: Some(0.1),
            table_size: Some(40),
        };
        pipeline_side.on_episode_end(&escaped).unwrap();

        let milestones = handle.read(MilestoneObserver::summary);
        assert_eq!(milestones.first_escape, Some(4));
        assert!(milestones.order_learned);
        assert_eq!(handle.read(MilestoneObserver::episodes), 1);
    }

    #[test]
    fn test_sanitize_summary_path() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/summary")),
            PathBuf::from("out/summary.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("summary.JSON")),
            PathBuf::from("summary.JSON")
        );
        let dir = format!("out{}", std::path::MAIN_SEPARATOR);
        assert_eq!(
            sanitize_summary_path(Path::new(&dir)),
            PathBuf::from("out").join("training_summary.json")
        );
    }
}
