//! CLI infrastructure for the castle puzzle
//!
//! This module provides the command-line interface for training, evaluating
//! and inspecting Q-learning value tables.

pub mod commands;
pub mod config;
pub mod output;
