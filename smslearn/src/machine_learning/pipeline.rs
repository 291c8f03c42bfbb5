// pipeline.rs

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    data_error::{DataError, DataResult},
    dataloader::SmsDataset,
    design_matrix::DesignMatrix,
    linear_classifier::{
        gradient_descent::{GradientDescent, TrainingParameters},
        logistic_regression::{decide, LogisticRegressionClassifier},
    },
    text::{count_vectorizer::CountVectorizer, normalizer::normalize},
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub max_vocabulary_size: usize,
    /// `None` uses 80% of the balanced dataset.
    pub train_size: Option<usize>,
    /// `None` uses everything left after the training messages.
    pub test_size: Option<usize>,
    pub seed: u64,
    pub training: TrainingParameters,
    /// Iterations between debug-level cost logs, 0 disables them.
    pub log_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_vocabulary_size: 1000,
            train_size: None,
            test_size: None,
            seed: 42,
            training: TrainingParameters::default(),
            log_interval: 100,
        }
    }
}

impl PipelineConfig {
    fn split_sizes(&self, available: usize) -> (usize, usize) {
        let train_size = self
            .train_size
            .unwrap_or((available as f64 * 0.8).round() as usize);
        let test_size = self
            .test_size
            .unwrap_or(available.saturating_sub(train_size));
        (train_size, test_size)
    }
}

/// A fitted vocabulary together with the classifier trained on it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SpamFilterModel {
    pub vectorizer: CountVectorizer,
    pub classifier: LogisticRegressionClassifier,
}

impl SpamFilterModel {
    /// Design-matrix row of one message, bias included.
    pub fn encode(&self, message: &str) -> DataResult<Vec<f64>> {
        let counts = self.vectorizer.transform(message)?;
        let mut row = Vec::with_capacity(counts.len() + 1);
        row.push(1.0);
        row.extend(counts);
        Ok(row)
    }

    pub fn spam_probability(&self, message: &str) -> DataResult<f64> {
        Ok(self.classifier.probability_one(&self.encode(message)?)?)
    }

    pub fn classify(&self, message: &str) -> DataResult<u8> {
        self.spam_probability(message).map(decide)
    }

    /// Most spam-indicative vocabulary words with their weights.
    pub fn top_words(&self, k: usize) -> DataResult<Vec<(&str, f64)>> {
        Ok(self
            .classifier
            .top_features(self.vectorizer.vocabulary(), k)?)
    }

    /// Most ham-indicative vocabulary words with their weights.
    pub fn bottom_words(&self, k: usize) -> DataResult<Vec<(&str, f64)>> {
        Ok(self
            .classifier
            .bottom_features(self.vectorizer.vocabulary(), k)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> DataResult<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Saved model to {}.", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let file = File::open(path.as_ref())?;
        let model: Self = serde_json::from_reader(BufReader::new(file))?;
        if model.vectorizer.vocabulary().len() + 1 != model.classifier.weights().len() {
            return Err(DataError::InvalidConfig {
                name: "weights",
                value: model.classifier.weights().len().to_string(),
                reason: "must hold one weight per vocabulary word plus the bias",
            });
        }
        Ok(model)
    }
}

pub struct TrainedPipeline {
    pub model: SpamFilterModel,
    pub cost_history: Vec<f64>,
    pub train_accuracy: f64,
    /// `None` when the test split is empty.
    pub test_accuracy: Option<f64>,
}

/// Balance, shuffle and split `dataset`, then fit the vocabulary and the classifier on
/// the training part and evaluate on both parts.
pub fn train_pipeline(
    dataset: &SmsDataset,
    config: &PipelineConfig,
) -> DataResult<TrainedPipeline> {
    config.training.validate()?;
    let shaped = dataset.balance(config.seed).shuffle(config.seed);
    let (train_size, test_size) = config.split_sizes(shaped.len());
    let (train, test) = shaped.split(train_size, test_size)?;
    info!(
        "Balanced dataset has {} messages, {} for training and {} for testing.",
        shaped.len(),
        train.len(),
        test.len()
    );

    let mut vectorizer = CountVectorizer::new(config.max_vocabulary_size, normalize);
    let train_counts = vectorizer.fit_vectorize(&train.messages)?;
    let x_train = DesignMatrix::with_bias(&train_counts)?;

    let optimizer = GradientDescent::new(config.training).with_log_interval(config.log_interval);
    let mut classifier = LogisticRegressionClassifier::new(x_train.cols());
    let cost_history = classifier.fit(&optimizer, &x_train, &train.labels)?;
    let train_accuracy = classifier.accuracy(&x_train, &train.labels)?;

    let test_accuracy = if test.is_empty() {
        None
    } else {
        let x_test = DesignMatrix::with_bias(&vectorizer.transform_all(&test.messages)?)?;
        Some(classifier.accuracy(&x_test, &test.labels)?)
    };
    info!(
        "Train accuracy {train_accuracy:.4}, test accuracy {}.",
        test_accuracy.map_or("n/a".to_string(), |acc| format!("{acc:.4}"))
    );

    Ok(TrainedPipeline {
        model: SpamFilterModel {
            vectorizer,
            classifier,
        },
        cost_history,
        train_accuracy,
        test_accuracy,
    })
}
