use serde::{Deserialize, Serialize};

/// Shape of a row-major matrix: `rows` examples by `cols` features.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions2D {
    pub rows: usize,
    pub cols: usize,
}

impl Dimensions2D {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// Same rows, one extra column for the bias term.
    pub fn with_bias(&self) -> Self {
        Self::new(self.rows, self.cols + 1)
    }
}

impl std::fmt::Display for Dimensions2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} x {})", self.rows, self.cols)
    }
}
