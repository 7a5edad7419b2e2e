use thiserror::Error;

/// Failure kinds raised by the pipeline stages.
///
/// Library functions return `anyhow::Result`, and these values travel inside it, so callers
/// that care about the kind can `downcast_ref::<PcaError>()`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PcaError {
    #[error("dataset does not contain any records")]
    EmptyDataset,

    #[error("required column '{column}' not found in header")]
    MissingColumn { column: String },

    #[error("column '{column}' has no non-missing values, mean imputation is undefined")]
    EmptyColumn { column: String },

    #[error("{0} has not been fitted yet")]
    NotFitted(&'static str),

    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix is not symmetric: |m[{row},{col}] - m[{col},{row}]| = {difference:e}")]
    NotSymmetric {
        row: usize,
        col: usize,
        difference: f64,
    },

    #[error("matrix contains a non-finite value at [{row},{col}]")]
    NonFinite { row: usize, col: usize },

    #[error("requested {requested} components but only {available} features are available")]
    InvalidComponentCount { requested: usize, available: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid train/test split: {0}")]
    InvalidSplit(String),

    #[error("need at least {required} rows, got {actual}")]
    InsufficientRows { required: usize, actual: usize },

    #[error("decomposition failed: {0}")]
    Decomposition(String),
}
