// hypothesis.rs

use rayon::prelude::*;

use super::classifier_error::{ClassifierError, Result};
use crate::machine_learning::design_matrix::{dot, DesignMatrix};

/// Linear scores are clipped to this magnitude before the sigmoid so the output never
/// rounds to exactly 0 or 1.
pub const MAX_LOGIT: f64 = 30.0;

/// Logistic function `1 / (1 + e^-z)`, strictly inside (0, 1) for finite `z`.
///
/// Branches on the sign of `z` so `exp` is only ever evaluated on non-positive values.
pub fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-MAX_LOGIT, MAX_LOGIT);
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Linear score `row · theta`. A score that overflowed is reported instead of being
/// clipped into a confident probability.
pub fn score(row: &[f64], theta: &[f64], index: usize) -> Result<f64> {
    let z = dot(row, theta);
    if !z.is_finite() {
        return Err(ClassifierError::divergence(format!("score[{index}]"), z));
    }
    Ok(z)
}

/// `sigmoid(X_i · theta)` for every row of `x`, in row order.
pub fn hypothesis(x: &DesignMatrix, theta: &[f64]) -> Result<Vec<f64>> {
    if theta.len() != x.cols() {
        return Err(ClassifierError::dimension_mismatch(
            "hypothesis",
            format!("theta of len {}", x.cols()),
            format!("theta of len {}", theta.len()),
        ));
    }
    // rows are independent, collect keeps the row order
    x.values()
        .par_chunks_exact(x.cols().max(1))
        .enumerate()
        .map(|(index, row)| score(row, theta, index).map(sigmoid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine_learning::linspace;
    use float_cmp::approx_eq;

    #[test]
    fn midpoint_is_exactly_half() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(sigmoid(-0.0), 0.5);
    }

    #[test]
    fn output_stays_in_open_unit_interval() {
        for z in linspace(-1000.0, 1000.0, 2001)
            .into_iter()
            .chain([f64::MAX, f64::MIN, 1e-300, -1e-300])
        {
            let h = sigmoid(z);
            assert!(h > 0.0 && h < 1.0, "sigmoid({z}) = {h}");
        }
    }

    #[test]
    fn symmetric_around_zero() {
        for z in linspace(-50.0, 50.0, 401) {
            assert!(approx_eq!(
                f64,
                sigmoid(z) + sigmoid(-z),
                1.0,
                epsilon = 1e-12
            ));
        }
    }

    #[test]
    fn monotonic() {
        let values: Vec<f64> = linspace(-20.0, 20.0, 200).into_iter().map(sigmoid).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn hypothesis_per_row() {
        let x = DesignMatrix::with_bias(&[vec![0.0], vec![2.0], vec![-2.0]]).unwrap();
        let h = hypothesis(&x, &[0.0, 1.0]).unwrap();
        assert_eq!(h.len(), 3);
        assert_eq!(h[0], 0.5);
        assert!(approx_eq!(f64, h[1], 1.0 / (1.0 + (-2.0f64).exp())));
        assert!(approx_eq!(f64, h[1] + h[2], 1.0, epsilon = 1e-12));
    }

    #[test]
    fn overflowing_score_is_divergence() {
        let x = DesignMatrix::from_rows(&[vec![1.0, 1e300], vec![1.0, -1e300]]).unwrap();
        let err = hypothesis(&x, &[0.0, 1e300]).unwrap_err();
        // either row may be reported first
        assert!(
            matches!(
                &err,
                ClassifierError::NumericalDivergence { iteration: None, quantity, value }
                    if quantity.starts_with("score[") && value.is_infinite()
            ),
            "{err:?}"
        );
        assert!(score(&[1.0, 2.0], &[0.5, 0.25], 0).unwrap() == 1.0);
    }

    #[test]
    fn hypothesis_rejects_wrong_theta_len() {
        let x = DesignMatrix::with_bias(&[vec![0.0, 1.0]]).unwrap();
        let err = hypothesis(&x, &[0.0, 1.0]).unwrap_err();
        assert!(matches!(err, ClassifierError::DimensionMismatch { .. }));
    }
}
