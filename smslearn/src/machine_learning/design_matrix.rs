// design_matrix.rs

use super::{
    dimensions::Dimensions2D,
    linear_classifier::classifier_error::{ClassifierError, Result},
};

/// Row-major feature matrix consumed by the logistic regression engine.
///
/// When built with [`DesignMatrix::with_bias`] column 0 holds the constant 1.0 and
/// columns `1..` hold the raw features in the order they were given.
#[derive(Clone, Debug, PartialEq)]
pub struct DesignMatrix {
    values: Vec<f64>,
    dimensions: Dimensions2D,
}

impl DesignMatrix {
    /// Build from a flat row-major buffer. Every value must be finite and a matrix with
    /// rows needs at least one column.
    pub fn from_values(values: Vec<f64>, dimensions: Dimensions2D) -> Result<Self> {
        if dimensions.rows > 0 && dimensions.cols == 0 {
            return Err(ClassifierError::NoFeatures { dimensions });
        }
        if values.len() != dimensions.size() {
            return Err(ClassifierError::dimension_mismatch(
                "DesignMatrix::from_values",
                format!("{} values for {dimensions}", dimensions.size()),
                format!("{} values", values.len()),
            ));
        }
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ClassifierError::NonFiniteFeature {
                row: index / dimensions.cols.max(1),
                col: index % dimensions.cols.max(1),
                value: *value,
            });
        }
        Ok(Self { values, dimensions })
    }

    /// Build from rows that already contain every column, bias included if wanted.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::build(rows, false)
    }

    /// Build from raw feature rows, prepending the constant bias column.
    pub fn with_bias(rows: &[Vec<f64>]) -> Result<Self> {
        Self::build(rows, true)
    }

    fn build(rows: &[Vec<f64>], bias: bool) -> Result<Self> {
        let features = rows.first().map_or(0, |row| row.len());
        let raw_dimensions = Dimensions2D::new(rows.len(), features);
        let dimensions = if bias {
            raw_dimensions.with_bias()
        } else {
            raw_dimensions
        };
        let mut values = Vec::with_capacity(dimensions.size());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != features {
                return Err(ClassifierError::RaggedRows {
                    row: i,
                    expected: features,
                    received: row.len(),
                });
            }
            if bias {
                values.push(1.0);
            }
            values.extend_from_slice(row);
        }
        Self::from_values(values, dimensions)
    }

    pub fn dimensions(&self) -> Dimensions2D {
        self.dimensions
    }

    pub fn rows(&self) -> usize {
        self.dimensions.rows
    }

    pub fn cols(&self) -> usize {
        self.dimensions.cols
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Panics if `index` is out of bounds, like slice indexing.
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.dimensions.cols;
        &self.values[start..start + self.dimensions.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.values.chunks_exact(self.dimensions.cols.max(1))
    }

    /// New matrix holding the given rows in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut values = Vec::with_capacity(indices.len() * self.dimensions.cols);
        for &index in indices {
            if index >= self.dimensions.rows {
                return Err(ClassifierError::dimension_mismatch(
                    "DesignMatrix::select_rows",
                    format!("row index below {}", self.dimensions.rows),
                    index,
                ));
            }
            values.extend_from_slice(self.row(index));
        }
        Ok(Self {
            values,
            dimensions: Dimensions2D::new(indices.len(), self.dimensions.cols),
        })
    }
}

/// Dot product of a feature row and the parameter vector. The caller checks lengths.
pub fn dot(row: &[f64], theta: &[f64]) -> f64 {
    row.iter().zip(theta).map(|(x, w)| x * w).sum()
}
