// gradient_descent.rs

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{
    classifier_error::{ClassifierError, Result},
    cost::{check_labels, check_shapes, cost_and_gradient},
};
use crate::machine_learning::design_matrix::DesignMatrix;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TrainingParameters {
    pub learning_rate: f64,
    pub iterations: usize,
}

impl Default for TrainingParameters {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            iterations: 1000,
        }
    }
}

impl TrainingParameters {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ClassifierError::InvalidHyperparameter {
                name: "iterations",
                value: self.iterations.to_string(),
                reason: "must be at least 1",
            });
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ClassifierError::InvalidHyperparameter {
                name: "learning_rate",
                value: self.learning_rate.to_string(),
                reason: "must be a finite positive number",
            });
        }
        Ok(())
    }
}

/// Final parameters and the cost recorded before each update.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainingResult {
    pub theta: Vec<f64>,
    pub cost_history: Vec<f64>,
}

impl TrainingResult {
    pub fn final_cost(&self) -> Option<f64> {
        self.cost_history.last().copied()
    }
}

/// Fixed-budget batch gradient descent on the logistic cost.
pub struct GradientDescent {
    parameters: TrainingParameters,
    log_interval: usize,
}

impl GradientDescent {
    pub fn new(parameters: TrainingParameters) -> Self {
        Self {
            parameters,
            log_interval: 100,
        }
    }

    /// How often the cost is emitted at debug level. 0 disables it.
    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }

    pub fn train(
        &self,
        x: &DesignMatrix,
        y: &[f64],
        initial_theta: Vec<f64>,
    ) -> Result<TrainingResult> {
        self.parameters.validate()?;
        check_shapes("GradientDescent::train", x, y, &initial_theta)?;
        check_labels(y)?;
        if let Some((j, value)) = initial_theta
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite())
        {
            return Err(ClassifierError::divergence(
                format!("initial theta[{j}]"),
                *value,
            ));
        }

        let TrainingParameters {
            learning_rate,
            iterations,
        } = self.parameters;
        info!(
            "Training on design matrix {} for {iterations} iterations with learning rate {learning_rate}.",
            x.dimensions()
        );

        let mut theta = initial_theta;
        let mut cost_history = Vec::with_capacity(iterations);
        for iteration in 0..iterations {
            let (next_theta, cost) = gradient_descent_step(x, y, &theta, learning_rate)
                .map_err(|err| at_iteration(err, iteration))
                .inspect_err(|err| error!("{err}"))?;
            if self.log_interval != 0 && iteration % self.log_interval == 0 {
                debug!("Iteration {iteration}: cost {cost}");
            }
            cost_history.push(cost);
            theta = next_theta;
        }

        info!(
            "Training finished with cost {}.",
            cost_history.last().copied().unwrap_or(f64::NAN)
        );
        Ok(TrainingResult {
            theta,
            cost_history,
        })
    }
}

/// One update `theta - alpha * grad(theta)`, returned with the cost at the input `theta`.
pub fn gradient_descent_step(
    x: &DesignMatrix,
    y: &[f64],
    theta: &[f64],
    learning_rate: f64,
) -> Result<(Vec<f64>, f64)> {
    let (cost, gradient) = cost_and_gradient(x, y, theta)?;
    let next_theta: Vec<f64> = theta
        .iter()
        .zip(&gradient)
        .map(|(w, g)| w - learning_rate * g)
        .collect();
    if let Some((j, value)) = next_theta.iter().enumerate().find(|(_, w)| !w.is_finite()) {
        return Err(ClassifierError::divergence(format!("theta[{j}]"), *value));
    }
    Ok((next_theta, cost))
}

fn at_iteration(err: ClassifierError, iteration: usize) -> ClassifierError {
    match err {
        ClassifierError::NumericalDivergence {
            quantity, value, ..
        } => ClassifierError::NumericalDivergence {
            iteration: Some(iteration),
            quantity,
            value,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine_learning::{
        compare_outputs, generate_blobs,
        linear_classifier::hypothesis::hypothesis,
    };

    fn toy_data() -> (DesignMatrix, Vec<f64>) {
        let x = DesignMatrix::from_rows(&[
            vec![1.0, 0.0, 0.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![1.0, 1.0, 1.0],
        ])
        .unwrap();
        (x, vec![0.0, 0.0, 1.0, 1.0])
    }

    fn optimizer(learning_rate: f64, iterations: usize) -> GradientDescent {
        GradientDescent::new(TrainingParameters {
            learning_rate,
            iterations,
        })
    }

    #[test]
    fn history_has_one_cost_per_iteration() {
        let (x, y) = toy_data();
        let result = optimizer(0.1, 37).train(&x, &y, vec![0.0; 3]).unwrap();
        assert_eq!(result.cost_history.len(), 37);
        assert_eq!(result.theta.len(), 3);
        // first entry is the cost of the zero initial theta
        assert!(compare_outputs(
            &result.cost_history[..1],
            &[std::f64::consts::LN_2]
        ));
    }

    #[test]
    fn small_learning_rate_never_increases_cost() {
        let (x, y) = toy_data();
        let result = optimizer(0.01, 2000).train(&x, &y, vec![0.0; 3]).unwrap();
        for (i, pair) in result.cost_history.windows(2).enumerate() {
            assert!(
                pair[1] <= pair[0] + 1e-12,
                "cost went up at iteration {}: {} -> {}",
                i + 1,
                pair[0],
                pair[1]
            );
        }
        assert!(result.final_cost().unwrap() < std::f64::consts::LN_2);
    }

    #[test]
    fn toy_dataset_is_separated() {
        let (x, y) = toy_data();
        let result = optimizer(0.1, 1000).train(&x, &y, vec![0.0; 3]).unwrap();
        let h = hypothesis(&x, &result.theta).unwrap();
        for (p, gt) in h.iter().zip(&y) {
            let label = if *p >= 0.5 { 1.0 } else { 0.0 };
            assert_eq!(label, *gt, "probability {p} for label {gt}");
        }
    }

    #[test]
    fn training_is_deterministic() {
        let (features, labels) = generate_blobs(50);
        let x = DesignMatrix::with_bias(&features).unwrap();
        let first = optimizer(0.5, 200).train(&x, &labels, vec![0.0; 3]).unwrap();
        let second = optimizer(0.5, 200).train(&x, &labels, vec![0.0; 3]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn step_is_pure() {
        let (x, y) = toy_data();
        let theta = vec![0.3, -0.2, 0.1];
        let (a, cost_a) = gradient_descent_step(&x, &y, &theta, 0.1).unwrap();
        let (b, cost_b) = gradient_descent_step(&x, &y, &theta, 0.1).unwrap();
        assert_eq!(theta, vec![0.3, -0.2, 0.1]);
        assert_eq!(a, b);
        assert_eq!(cost_a, cost_b);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let (x, y) = toy_data();
        for (learning_rate, iterations) in [(0.1, 0), (0.0, 10), (-1.0, 10), (f64::NAN, 10)] {
            let err = optimizer(learning_rate, iterations)
                .train(&x, &y, vec![0.0; 3])
                .unwrap_err();
            assert!(matches!(err, ClassifierError::InvalidHyperparameter { .. }));
        }
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let (x, y) = toy_data();
        let err = optimizer(0.1, 10).train(&x, &y, vec![0.0; 4]).unwrap_err();
        assert!(matches!(err, ClassifierError::DimensionMismatch { .. }));
        let err = optimizer(0.1, 10)
            .train(&x, &y[..2], vec![0.0; 3])
            .unwrap_err();
        assert!(matches!(err, ClassifierError::DimensionMismatch { .. }));
    }

    #[test]
    fn divergence_is_reported() {
        let x = DesignMatrix::with_bias(&[vec![100.0], vec![0.0]]).unwrap();
        let y = vec![0.0, 1.0];
        let err = optimizer(1e308, 5).train(&x, &y, vec![0.0; 2]).unwrap_err();
        assert!(
            matches!(
                err,
                ClassifierError::NumericalDivergence {
                    iteration: Some(0),
                    ..
                }
            ),
            "{err:?}"
        );
        assert!(err.to_string().contains("in iteration 0"));
    }

    #[test]
    fn overflowing_score_stops_training() {
        let x = DesignMatrix::from_rows(&[vec![1.0, 1e300], vec![1.0, 0.0]]).unwrap();
        let err = optimizer(0.1, 5)
            .with_log_interval(1)
            .train(&x, &[1.0, 0.0], vec![0.0, 1e300])
            .unwrap_err();
        assert_eq!(
            err,
            ClassifierError::NumericalDivergence {
                iteration: Some(0),
                quantity: "score[0]".to_string(),
                value: f64::INFINITY,
            }
        );
    }
}
