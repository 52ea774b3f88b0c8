//! Training and evaluation pipeline abstractions
//!
//! This module provides composable pipelines for:
//! - Training the Q-learning agent with checkpointing and early stopping
//! - Evaluating fixed policies
//! - Recording observations during training

pub mod baselines;
pub mod evaluation;
pub mod observers;
pub mod training;

pub use baselines::{GreedyLearner, RandomLearner};
pub use evaluation::{EvaluationConfig, EvaluationResult, evaluate, watch_episode};
pub use observers::{
    CsvObserver, LogObserver, MetricsObserver, MetricsSummary, MilestoneObserver,
    MilestoneSummary, ProgressObserver,
};
pub use training::{EpisodeSummary, TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Learner, Observer};
