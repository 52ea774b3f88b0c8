//! Inspect command - Summarize a saved value table

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::output::{format_number, print_kv, print_section, print_subsection},
    q_learning::{LoadStatus, QLearningAgent, QTable},
    types::{ACTION_COUNT, Action},
};

#[derive(Parser, Debug)]
#[command(about = "Show statistics for a saved value table")]
pub struct InspectArgs {
    /// Path to the saved value table
    #[arg(default_value = "q_table.msgpack")]
    pub table: PathBuf,

    /// Number of highest-valued states to list
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Print the statistics as JSON instead
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Statistics over every stored row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub entries: usize,
    pub min_value: f64,
    pub max_value: f64,
    pub mean_value: f64,
    /// Greedy action counts, indexed like [`Action::ALL`]
    pub greedy_actions: [usize; ACTION_COUNT],
    /// Keys with the highest state value, best first
    pub top_states: Vec<(String, f64)>,
}

impl TableStats {
    pub fn from_table(table: &QTable, top: usize) -> Self {
        let mut min_value = f64::INFINITY;
        let mut max_value = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut greedy_actions = [0; ACTION_COUNT];
        let mut state_values = Vec::with_capacity(table.size());

        for (key, values) in table.iter() {
            for &value in values {
                min_value = min_value.min(value);
                max_value = max_value.max(value);
                sum += value;
            }
            // First maximum, as the agent breaks ties
            let (best, best_value) = values.iter().copied().enumerate().fold(
                (0, f64::NEG_INFINITY),
                |acc, (i, v)| if v > acc.1 { (i, v) } else { acc },
            );
            greedy_actions[best] += 1;
            state_values.push((key.to_string(), best_value));
        }

        state_values.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        state_values.truncate(top);

        let entries = table.size();
        if entries == 0 {
            min_value = 0.0;
            max_value = 0.0;
        }
        Self {
            entries,
            min_value,
            max_value,
            mean_value: if entries == 0 {
                0.0
            } else {
                sum / (entries * ACTION_COUNT) as f64
            },
            greedy_actions,
            top_states: state_values,
        }
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let mut agent = QLearningAgent::default();
    match agent.load_table(&args.table) {
        LoadStatus::Loaded { .. } => {}
        LoadStatus::Missing => bail!("no value table at {}", args.table.display()),
        LoadStatus::Corrupt { reason } => {
            bail!("value table {} is unreadable: {reason}", args.table.display())
        }
    }

    let stats = TableStats::from_table(agent.q_table(), args.top);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_section(&format!("Value table: {}", args.table.display()));
    print_kv("Entries", &format_number(stats.entries));
    print_kv(
        "Value range",
        &format!("{:.2} .. {:.2}", stats.min_value, stats.max_value),
    );
    print_kv("Mean value", &format!("{:.2}", stats.mean_value));

    print_subsection("Greedy actions");
    for (action, count) in Action::ALL.iter().zip(stats.greedy_actions) {
        print_kv(&action.to_string(), &format_number(count));
    }

    if !stats.top_states.is_empty() {
        print_subsection("Top states");
        for (key, value) in &stats.top_states {
            print_kv(key, &format!("{value:.2}"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{q_learning::StateKey, types::Offset};

    #[test]
    fn test_stats_over_rows() {
        let mut table = QTable::new(0.2, 0.99);
        let near = StateKey::new(Some(Offset::new(0, 1)), None, vec![]);
        let far = StateKey::new(Some(Offset::new(3, 3)), None, vec![]);
        table.set(near.clone(), [0.0, 0.0, 0.0, 0.0, 20.0]);
        table.set(far, [-1.0, 4.0, 4.0, 0.0, 0.0]);

        let stats = TableStats::from_table(&table, 1);
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.min_value, -1.0);
        assert_eq!(stats.max_value, 20.0);
        assert_eq!(stats.mean_value, 2.7);
        assert_eq!(stats.greedy_actions, [0, 1, 0, 0, 1]);
        assert_eq!(stats.top_states, vec![(near.to_string(), 20.0)]);
    }

    #[test]
    fn test_empty_table_stats() {
        let stats = TableStats::from_table(&QTable::new(0.2, 0.99), 5);
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.max_value, 0.0);
        assert_eq!(stats.greedy_actions, [0; ACTION_COUNT]);
    }
}
