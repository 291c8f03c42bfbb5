// logistic_regression.rs

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{
    classifier_error::{ClassifierError, Result},
    gradient_descent::{GradientDescent, TrainingParameters, TrainingResult},
    hypothesis::{hypothesis, score, sigmoid},
    HAM, SPAM,
};
use crate::machine_learning::design_matrix::DesignMatrix;

/// Probabilities at or above this value are classified as spam.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Fits `theta` from `initial_theta` with batch gradient descent.
pub fn train(
    x: &DesignMatrix,
    y: &[f64],
    initial_theta: Vec<f64>,
    learning_rate: f64,
    iterations: usize,
) -> Result<TrainingResult> {
    GradientDescent::new(TrainingParameters {
        learning_rate,
        iterations,
    })
    .train(x, y, initial_theta)
}

/// Maps a spam probability to a label, 0.5 resolving to spam.
pub fn decide(probability: f64) -> u8 {
    if probability >= DECISION_THRESHOLD {
        SPAM
    } else {
        HAM
    }
}

/// Classifies a single design-matrix row, bias column included.
pub fn predict_one(x: &[f64], theta: &[f64]) -> Result<u8> {
    if x.len() != theta.len() {
        return Err(ClassifierError::dimension_mismatch(
            "predict_one",
            format!("row of len {}", theta.len()),
            format!("row of len {}", x.len()),
        ));
    }
    Ok(decide(sigmoid(score(x, theta, 0)?)))
}

pub fn predict_batch(x: &DesignMatrix, theta: &[f64]) -> Result<Vec<u8>> {
    Ok(hypothesis(x, theta)?.into_iter().map(decide).collect())
}

/// Fraction of rows whose predicted label equals the ground truth.
pub fn accuracy(x: &DesignMatrix, y: &[f64], theta: &[f64]) -> Result<f64> {
    if x.rows() != y.len() {
        return Err(ClassifierError::dimension_mismatch(
            "accuracy",
            format!("{} labels", x.rows()),
            format!("{} labels", y.len()),
        ));
    }
    if y.is_empty() {
        return Err(ClassifierError::EmptyTrainingData {
            dimensions: x.dimensions(),
        });
    }
    let predictions = predict_batch(x, theta)?;
    let correct_predictions = predictions
        .iter()
        .zip(y)
        .filter(|(prediction, gt)| f64::from(**prediction) == **gt)
        .count();
    Ok(correct_predictions as f64 / y.len() as f64)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LogisticRegressionClassifier {
    weights: Vec<f64>,
}

impl LogisticRegressionClassifier {
    /// Untrained classifier over `input_size` columns (bias included), weights at zero.
    pub fn new(input_size: usize) -> Self {
        LogisticRegressionClassifier {
            weights: vec![0.0; input_size],
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Trains from the current weights and keeps the result. The weights are left
    /// untouched when training fails.
    pub fn fit(
        &mut self,
        optimizer: &GradientDescent,
        x: &DesignMatrix,
        y: &[f64],
    ) -> Result<Vec<f64>> {
        let TrainingResult {
            theta,
            cost_history,
        } = optimizer.train(x, y, self.weights.clone())?;
        self.weights = theta;
        Ok(cost_history)
    }

    pub fn probability_one(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.weights.len() {
            return Err(ClassifierError::dimension_mismatch(
                "probability_one",
                format!("row of len {}", self.weights.len()),
                format!("row of len {}", x.len()),
            ));
        }
        Ok(sigmoid(score(x, &self.weights, 0)?))
    }

    pub fn accuracy(&self, x: &DesignMatrix, y: &[f64]) -> Result<f64> {
        accuracy(x, y, &self.weights)
    }

    /// The `k` features with the largest weights, most spam-like first. `vocabulary[i]`
    /// names weight `i + 1`; the bias is skipped.
    pub fn top_features<'a>(
        &self,
        vocabulary: &'a [String],
        k: usize,
    ) -> Result<Vec<(&'a str, f64)>> {
        self.ranked_features(vocabulary, k, true)
    }

    /// The `k` features with the smallest weights, most ham-like first.
    pub fn bottom_features<'a>(
        &self,
        vocabulary: &'a [String],
        k: usize,
    ) -> Result<Vec<(&'a str, f64)>> {
        self.ranked_features(vocabulary, k, false)
    }

    fn ranked_features<'a>(
        &self,
        vocabulary: &'a [String],
        k: usize,
        descending: bool,
    ) -> Result<Vec<(&'a str, f64)>> {
        if vocabulary.len() + 1 != self.weights.len() {
            return Err(ClassifierError::dimension_mismatch(
                "ranked_features",
                format!("vocabulary of len {}", self.weights.len().saturating_sub(1)),
                format!("vocabulary of len {}", vocabulary.len()),
            ));
        }
        // stable sort, equal weights stay in vocabulary order
        let ranked = vocabulary
            .iter()
            .zip(&self.weights[1..])
            .sorted_by(|a, b| {
                if descending {
                    b.1.total_cmp(a.1)
                } else {
                    a.1.total_cmp(b.1)
                }
            })
            .take(k)
            .map(|(word, weight)| (word.as_str(), *weight))
            .collect();
        Ok(ranked)
    }
}
