//! Evaluate command - Run greedy episodes with a saved value table

use std::{fs::File, path::PathBuf, time::Duration};

use anyhow::{Result, bail};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    castle::GridEnvironment,
    cli::{
        config::EnvArgs,
        output::{format_number, format_percent, print_kv, print_section, print_subsection},
    },
    pipeline::{
        EvaluationConfig, EvaluationResult, GreedyLearner, RandomLearner, evaluate, watch_episode,
    },
    q_learning::{LoadStatus, QLearningAgent},
    render::TextRenderer,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained value table")]
pub struct EvaluateArgs {
    /// Path to the saved value table
    #[arg(default_value = "q_table.msgpack")]
    pub table: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Driver-side step limit per episode
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also evaluate a uniform random policy for comparison
    #[arg(long, default_value_t = false)]
    pub baseline: bool,

    /// Render one greedy episode to the terminal first
    #[arg(long, default_value_t = false)]
    pub render: bool,

    /// Delay between rendered frames in milliseconds
    #[arg(long, default_value_t = 200)]
    pub delay_ms: u64,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub env: EnvArgs,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let env_config = args.env.to_env_config()?;
    let mut env = GridEnvironment::new(env_config)?;

    let mut agent = QLearningAgent::default();
    match agent.load_table(&args.table) {
        LoadStatus::Loaded { entries } => {
            println!(
                "Loaded {} table entries from {}",
                format_number(entries),
                args.table.display()
            );
        }
        LoadStatus::Missing => bail!("no value table at {}", args.table.display()),
        LoadStatus::Corrupt { reason } => {
            bail!("value table {} is unreadable: {reason}", args.table.display())
        }
    }

    let config = EvaluationConfig {
        episodes: args.episodes,
        max_steps_per_episode: args.max_steps,
        seed: args.seed,
    };

    if args.render {
        let renderer = TextRenderer::new().with_frame_delay(Duration::from_millis(args.delay_ms));
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut greedy = GreedyLearner::new(&agent);
        let (reward, outcome) =
            watch_episode(&mut env, &mut greedy, &mut rng, args.max_steps, &renderer)?;
        println!("Rendered episode: {outcome:?} with reward {reward:.1}");
    }

    let mut results = Vec::new();
    let mut greedy = GreedyLearner::new(&agent);
    results.push(evaluate(&mut env, &mut greedy, &config, &mut [])?);

    if args.baseline {
        let mut random = RandomLearner::default();
        results.push(evaluate(&mut env, &mut random, &config, &mut [])?);
    }

    print_section("Evaluation Results");
    for result in &results {
        print_result(result);
    }

    if let Some(path) = &args.export {
        serde_json::to_writer_pretty(File::create(path)?, &results)?;
        println!("\nResults exported to: {}", path.display());
    }

    Ok(())
}

fn print_result(result: &EvaluationResult) {
    print_subsection(&result.learner);
    print_kv("Episodes", &format_number(result.episodes));
    print_kv("Escapes", &format_number(result.escapes));
    print_kv("Wrong order", &format_number(result.wrong_order));
    print_kv("Out of steps", &format_number(result.out_of_steps));
    print_kv("Success rate", &format_percent(result.success_rate));
    print_kv("Mean reward", &format!("{:.1}", result.mean_reward));
    print_kv("Mean steps", &format!("{:.1}", result.mean_steps));
}
