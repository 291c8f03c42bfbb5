mod commands;

use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use smslearn::machine_learning::{
    linear_classifier::gradient_descent::TrainingParameters, pipeline::PipelineConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about)]
pub struct SmsFilterArgs {
    #[command(subcommand)]
    mode: SmsFilterMode,
}

#[derive(Subcommand)]
pub enum SmsFilterMode {
    /// Train a spam filter on a tab-separated `label<TAB>message` file
    Train {
        dataset: PathBuf,
        #[command(flatten)]
        training_args: TrainArgs,
    },
    /// Classify messages with a saved model
    Predict {
        model: PathBuf,
        #[arg(required = true)]
        messages: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of most frequent words kept as features
    #[arg(long, default_value_t = 1000)]
    pub vocabulary_size: usize,

    /// Gradient descent step size (alpha)
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Number of gradient descent iterations
    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,

    /// Training messages after balancing, 80% of them when omitted
    #[arg(long)]
    pub train_size: Option<usize>,

    /// Test messages after the training ones, the rest when omitted
    #[arg(long)]
    pub test_size: Option<usize>,

    /// Seed for balancing and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Iterations between cost logs at debug level, 0 disables them
    #[arg(long, default_value_t = 100)]
    pub log_interval: usize,

    /// Number of spam-indicative and ham-indicative words to print
    #[arg(long, default_value_t = 10)]
    pub top_words: usize,

    #[arg(long)]
    pub save_model: Option<PathBuf>,

    /// Write the per-iteration cost as JSON
    #[arg(long)]
    pub cost_history: Option<PathBuf>,
}

impl From<&TrainArgs> for PipelineConfig {
    fn from(value: &TrainArgs) -> Self {
        PipelineConfig {
            max_vocabulary_size: value.vocabulary_size,
            train_size: value.train_size,
            test_size: value.test_size,
            seed: value.seed,
            training: TrainingParameters {
                learning_rate: value.learning_rate,
                iterations: value.iterations,
            },
            log_interval: value.log_interval,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = SmsFilterArgs::parse();
    match commands::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
