// dataloader.rs

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use tracing::info;

use super::data_error::{DataError, DataResult};
use super::linear_classifier::{HAM, SPAM};

/// Labelled SMS messages, `labels[i]` belonging to `messages[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmsDataset {
    pub messages: Vec<String>,
    pub labels: Vec<f64>,
}

fn parse_label(label: &str, line: usize) -> DataResult<f64> {
    match label.trim() {
        "ham" => Ok(f64::from(HAM)),
        "spam" => Ok(f64::from(SPAM)),
        other => Err(DataError::UnknownLabel {
            line,
            label: other.to_string(),
        }),
    }
}

impl SmsDataset {
    pub fn new(messages: Vec<String>, labels: Vec<f64>) -> DataResult<Self> {
        if messages.len() != labels.len() {
            return Err(DataError::InvalidConfig {
                name: "labels",
                value: labels.len().to_string(),
                reason: "must have one label per message",
            });
        }
        Ok(Self { messages, labels })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let file = File::open(path.as_ref())?;
        let dataset = Self::parse(BufReader::new(file))?;
        let (ham, spam) = dataset.class_counts();
        info!(
            "Loaded {} messages ({ham} ham, {spam} spam) from {}.",
            dataset.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    /// Reads `label<TAB>message` lines, skipping blank ones. Line numbers in errors
    /// start at 1.
    pub fn parse<R: BufRead>(reader: R) -> DataResult<Self> {
        let mut dataset = Self::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            let Some((label, message)) = line.split_once('\t') else {
                return Err(DataError::ParseError {
                    line: line_number,
                    message: "expected a tab between the label and the message".to_string(),
                });
            };
            dataset.labels.push(parse_label(label, line_number)?);
            dataset.messages.push(message.to_string());
        }
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(ham, spam)` message counts.
    pub fn class_counts(&self) -> (usize, usize) {
        let spam = self
            .labels
            .iter()
            .filter(|&&label| label == f64::from(SPAM))
            .count();
        (self.len() - spam, spam)
    }

    fn select(&self, indices: &[usize]) -> Self {
        let mut messages = Vec::with_capacity(indices.len());
        let mut labels = Vec::with_capacity(indices.len());
        for &ind in indices {
            messages.push(self.messages[ind].clone());
            labels.push(self.labels[ind]);
        }
        Self { messages, labels }
    }

    /// Randomly drops majority-class messages until both classes have the minority
    /// count. Kept messages stay in their original order.
    pub fn balance(&self, seed: u64) -> Self {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let (ham_indices, spam_indices): (Vec<usize>, Vec<usize>) =
            (0..self.len()).partition(|&i| self.labels[i] != f64::from(SPAM));
        let (majority, minority) = if ham_indices.len() >= spam_indices.len() {
            (ham_indices, spam_indices)
        } else {
            (spam_indices, ham_indices)
        };
        let mut kept: Vec<usize> = index::sample(&mut rng, majority.len(), minority.len())
            .into_iter()
            .map(|i| majority[i])
            .chain(minority)
            .collect();
        kept.sort_unstable();
        self.select(&kept)
    }

    pub fn shuffle(&self, seed: u64) -> Self {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let mut indices = (0..self.len()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        self.select(&indices)
    }

    /// First `train_size` messages for training, the following `test_size` for testing.
    pub fn split(&self, train_size: usize, test_size: usize) -> DataResult<(Self, Self)> {
        if train_size == 0 {
            return Err(DataError::InvalidConfig {
                name: "train_size",
                value: train_size.to_string(),
                reason: "must be at least 1",
            });
        }
        if train_size + test_size > self.len() {
            return Err(DataError::InsufficientData {
                purpose: "the train/test split",
                requested: train_size + test_size,
                available: self.len(),
            });
        }
        let train_indices = (0..train_size).collect::<Vec<_>>();
        let test_indices = (train_size..train_size + test_size).collect::<Vec<_>>();
        Ok((self.select(&train_indices), self.select(&test_indices)))
    }
}
