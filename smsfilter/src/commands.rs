use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use smslearn::machine_learning::{
    data_error::DataResult,
    dataloader::SmsDataset,
    linear_classifier::SPAM,
    pipeline::{train_pipeline, PipelineConfig, SpamFilterModel},
};
use tracing::info;

use crate::{SmsFilterArgs, SmsFilterMode, TrainArgs};

/// Messages printed after training to show the filter on unseen text.
const DEMO_MESSAGES: [&str; 2] = [
    "Congratulations! You've won a £1000 cash prize. Call now to claim your reward",
    "Hey, are we still meeting for lunch tomorrow? Let me know",
];

pub fn run(args: SmsFilterArgs) -> DataResult<()> {
    match args.mode {
        SmsFilterMode::Train {
            dataset,
            training_args,
        } => train(&dataset, &training_args),
        SmsFilterMode::Predict { model, messages } => predict(&model, &messages),
    }
}

fn label_name(label: u8) -> &'static str {
    if label == SPAM {
        "spam"
    } else {
        "ham"
    }
}

fn train(dataset: &Path, training_args: &TrainArgs) -> DataResult<()> {
    let dataset = SmsDataset::load(dataset)?;
    let config = PipelineConfig::from(training_args);
    let trained = train_pipeline(&dataset, &config)?;

    println!("Train accuracy: {:.4}", trained.train_accuracy);
    match trained.test_accuracy {
        Some(accuracy) => println!("Test accuracy: {accuracy:.4}"),
        None => println!("Test accuracy: n/a (empty test split)"),
    }

    if training_args.top_words > 0 {
        println!("Top {} spam words:", training_args.top_words);
        for (word, weight) in trained.model.top_words(training_args.top_words)? {
            println!("  {word:<16} {weight:.4}");
        }
        println!("Top {} ham words:", training_args.top_words);
        for (word, weight) in trained.model.bottom_words(training_args.top_words)? {
            println!("  {word:<16} {weight:.4}");
        }
    }

    for message in DEMO_MESSAGES {
        print_prediction(&trained.model, message)?;
    }

    if let Some(path) = &training_args.cost_history {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &trained.cost_history)?;
        writer.flush()?;
        info!("Wrote cost history to {}.", path.display());
    }
    if let Some(path) = &training_args.save_model {
        trained.model.save(path)?;
    }
    Ok(())
}

fn predict(model: &Path, messages: &[String]) -> DataResult<()> {
    let model = SpamFilterModel::load(model)?;
    for message in messages {
        print_prediction(&model, message)?;
    }
    Ok(())
}

fn print_prediction(model: &SpamFilterModel, message: &str) -> DataResult<()> {
    let probability = model.spam_probability(message)?;
    let label = model.classify(message)?;
    println!("{:<4} ({probability:.4}) {message}", label_name(label));
    Ok(())
}
