use crate::machine_learning::dimensions::Dimensions2D;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Dimension mismatch in `{operation}`. Expected {expected} but received {received}.")]
    DimensionMismatch {
        operation: String,
        expected: String,
        received: String,
    },
    #[error("Ragged rows when building a design matrix. Row {row} has {received} values, expected {expected}.")]
    RaggedRows {
        row: usize,
        expected: usize,
        received: usize,
    },
    #[error("The design matrix {dimensions} has rows but no columns.")]
    NoFeatures { dimensions: Dimensions2D },
    #[error("Non-finite value {value} at row {row}, column {col} of the design matrix.")]
    NonFiniteFeature { row: usize, col: usize, value: f64 },
    #[error("Label {value} at row {row} is not 0 or 1.")]
    InvalidLabel { row: usize, value: f64 },
    #[error("The design matrix {dimensions} contains no examples.")]
    EmptyTrainingData { dimensions: Dimensions2D },
    #[error("Invalid hyperparameter `{name}` with value {value}: {reason}.")]
    InvalidHyperparameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("Numerical divergence{}: {quantity} became {value}. The learning rate is likely too large for the data scale.", in_iteration(.iteration))]
    NumericalDivergence {
        /// Set when the value came up during gradient descent.
        iteration: Option<usize>,
        quantity: String,
        value: f64,
    },
}

fn in_iteration(iteration: &Option<usize>) -> String {
    iteration.map_or_else(String::new, |iteration| format!(" in iteration {iteration}"))
}

impl ClassifierError {
    pub fn dimension_mismatch(
        operation: &str,
        expected: impl ToString,
        received: impl ToString,
    ) -> Self {
        Self::DimensionMismatch {
            operation: operation.to_string(),
            expected: expected.to_string(),
            received: received.to_string(),
        }
    }

    pub fn divergence(quantity: impl ToString, value: f64) -> Self {
        Self::NumericalDivergence {
            iteration: None,
            quantity: quantity.to_string(),
            value,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
