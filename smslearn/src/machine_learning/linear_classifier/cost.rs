// cost.rs

use super::{
    classifier_error::{ClassifierError, Result},
    hypothesis::hypothesis,
};
use crate::machine_learning::design_matrix::DesignMatrix;

/// Probabilities are kept this far away from 0 and 1 before taking logarithms.
pub const PROBABILITY_EPSILON: f64 = 1e-15;

/// Checks that `x`, `y` and `theta` agree on their shapes and that there is data.
pub fn check_shapes(operation: &str, x: &DesignMatrix, y: &[f64], theta: &[f64]) -> Result<()> {
    if x.rows() != y.len() {
        return Err(ClassifierError::dimension_mismatch(
            operation,
            format!("{} labels for design matrix {}", x.rows(), x.dimensions()),
            format!("{} labels", y.len()),
        ));
    }
    if x.cols() != theta.len() {
        return Err(ClassifierError::dimension_mismatch(
            operation,
            format!("theta of len {} for design matrix {}", x.cols(), x.dimensions()),
            format!("theta of len {}", theta.len()),
        ));
    }
    if x.rows() == 0 {
        return Err(ClassifierError::EmptyTrainingData {
            dimensions: x.dimensions(),
        });
    }
    Ok(())
}

/// Every label must be exactly 0 or 1.
pub fn check_labels(y: &[f64]) -> Result<()> {
    match y
        .iter()
        .enumerate()
        .find(|(_, label)| **label != 0.0 && **label != 1.0)
    {
        Some((row, &value)) => Err(ClassifierError::InvalidLabel { row, value }),
        None => Ok(()),
    }
}

fn cross_entropy(h: &[f64], y: &[f64]) -> f64 {
    let total: f64 = h
        .iter()
        .zip(y)
        .map(|(&h, &y)| {
            let h = h.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
            y * h.ln() + (1.0 - y) * (1.0 - h).ln()
        })
        .sum();
    -total / y.len() as f64
}

fn cross_entropy_gradient(x: &DesignMatrix, h: &[f64], y: &[f64]) -> Vec<f64> {
    let mut gradient = vec![0.0; x.cols()];
    // sequential accumulation keeps the sum order, and so the result, fixed
    for ((row, prediction), gt) in x.iter_rows().zip(h).zip(y) {
        let error = prediction - gt;
        for (g, feature) in gradient.iter_mut().zip(row) {
            *g += error * feature;
        }
    }
    let m = y.len() as f64;
    gradient.iter_mut().for_each(|g| *g /= m);
    gradient
}

/// Average negative log-likelihood `J(theta)` over all rows.
pub fn cost(x: &DesignMatrix, y: &[f64], theta: &[f64]) -> Result<f64> {
    check_shapes("cost", x, y, theta)?;
    let h = hypothesis(x, theta)?;
    let cost = cross_entropy(&h, y);
    if !cost.is_finite() {
        return Err(ClassifierError::divergence("cost", cost));
    }
    Ok(cost)
}

/// Analytic gradient `(1/m) X^T (h - y)`.
pub fn gradient(x: &DesignMatrix, y: &[f64], theta: &[f64]) -> Result<Vec<f64>> {
    cost_and_gradient(x, y, theta).map(|(_, gradient)| gradient)
}

/// Cost and gradient at `theta`, sharing one hypothesis evaluation.
pub fn cost_and_gradient(x: &DesignMatrix, y: &[f64], theta: &[f64]) -> Result<(f64, Vec<f64>)> {
    check_shapes("cost_and_gradient", x, y, theta)?;
    let h = hypothesis(x, theta)?;
    let cost = cross_entropy(&h, y);
    if !cost.is_finite() {
        return Err(ClassifierError::divergence("cost", cost));
    }
    let gradient = cross_entropy_gradient(x, &h, y);
    if let Some((j, value)) = gradient.iter().enumerate().find(|(_, g)| !g.is_finite()) {
        return Err(ClassifierError::divergence(format!("gradient[{j}]"), *value));
    }
    Ok((cost, gradient))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine_learning::generate_blobs;
    use float_cmp::approx_eq;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

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

    #[test]
    fn zero_theta_cost_is_ln_two() {
        let (x, y) = toy_data();
        let cost = cost(&x, &y, &[0.0; 3]).unwrap();
        assert!(approx_eq!(f64, cost, std::f64::consts::LN_2, epsilon = 1e-12));
    }

    #[test]
    fn zero_theta_gradient() {
        let (x, y) = toy_data();
        let gradient = gradient(&x, &y, &[0.0; 3]).unwrap();
        // h = 0.5 everywhere, so grad = mean((0.5 - y) * x)
        assert!(approx_eq!(f64, gradient[0], 0.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, gradient[1], -0.25, epsilon = 1e-12));
        assert!(approx_eq!(f64, gradient[2], 0.0, epsilon = 1e-12));
    }

    #[test]
    fn cost_is_never_negative() {
        let (x, y) = toy_data();
        let mut rng = XorShiftRng::seed_from_u64(7);
        for _ in 0..50 {
            let theta: Vec<f64> = (0..3).map(|_| rng.gen_range(-100.0..100.0)).collect();
            assert!(cost(&x, &y, &theta).unwrap() >= 0.0);
        }
    }

    #[test]
    fn saturated_predictions_have_finite_cost() {
        let (x, y) = toy_data();
        // confidently wrong on every row
        let cost = cost(&x, &y, &[1e6, -1e7, 0.0]).unwrap();
        assert!(cost.is_finite());
        assert!(cost > 1.0);
    }

    #[test]
    fn analytic_gradient_matches_finite_differences() {
        let (features, labels) = generate_blobs(20);
        let x = DesignMatrix::with_bias(&features).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(1234);
        let step = 1e-6;
        for _ in 0..5 {
            let theta: Vec<f64> = (0..x.cols()).map(|_| rng.gen_range(-2.0..2.0)).collect();
            let analytic = gradient(&x, &labels, &theta).unwrap();
            for j in 0..theta.len() {
                let mut plus = theta.clone();
                let mut minus = theta.clone();
                plus[j] += step;
                minus[j] -= step;
                let numeric = (cost(&x, &labels, &plus).unwrap()
                    - cost(&x, &labels, &minus).unwrap())
                    / (2.0 * step);
                assert!(
                    (numeric - analytic[j]).abs() < 1e-4,
                    "gradient[{j}]: analytic {} numeric {numeric}",
                    analytic[j]
                );
            }
        }
    }

    #[test]
    fn overflowing_score_fails_cost() {
        let x = DesignMatrix::from_rows(&[vec![1.0, 1e300], vec![1.0, 0.0]]).unwrap();
        let err = cost(&x, &[1.0, 0.0], &[0.0, 1e300]).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::NumericalDivergence {
                iteration: None,
                quantity: "score[0]".to_string(),
                value: f64::INFINITY,
            }
        );
    }

    #[test]
    fn overflowing_gradient_is_divergence() {
        // each row adds 0.5 * 1e308 to gradient[1], the sum overflows
        let x = DesignMatrix::from_rows(&vec![vec![1.0, 1e308]; 4]).unwrap();
        let err = gradient(&x, &[0.0; 4], &[0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::NumericalDivergence {
                iteration: None,
                quantity: "gradient[1]".to_string(),
                value: f64::INFINITY,
            }
        );
        assert!(!err.to_string().contains("iteration"));
    }

    #[test]
    fn shape_mismatches_fail_before_computing() {
        let (x, y) = toy_data();
        assert!(matches!(
            cost(&x, &y[..3], &[0.0; 3]),
            Err(ClassifierError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            gradient(&x, &y, &[0.0; 2]),
            Err(ClassifierError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let x = DesignMatrix::from_rows(&[]).unwrap();
        assert!(matches!(
            cost(&x, &[], &[]),
            Err(ClassifierError::EmptyTrainingData { .. })
        ));
    }

    #[test]
    fn labels_must_be_binary() {
        assert!(check_labels(&[0.0, 1.0, 1.0]).is_ok());
        assert_eq!(
            check_labels(&[0.0, 0.5]),
            Err(ClassifierError::InvalidLabel { row: 1, value: 0.5 })
        );
    }
}
