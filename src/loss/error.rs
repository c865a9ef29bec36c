//! Error type shared by the loss routines and their helpers.

use thiserror::Error;

/// Caller-input errors detected before any arithmetic is performed.
#[derive(Debug, Error)]
pub enum LossError {
    #[error("weight matrix has {weight_rows} rows but data matrix has {data_cols} columns")]
    ShapeMismatch { weight_rows: usize, data_cols: usize },

    #[error("got {labels} labels for {examples} examples")]
    LabelCountMismatch { labels: usize, examples: usize },

    #[error("label {label} at index {index} is outside [0, {classes})")]
    LabelOutOfRange { index: usize, label: usize, classes: usize },

    #[error("batch contains no examples")]
    EmptyBatch,

    #[error("weight matrix has no class columns")]
    NoClasses,

    #[error("regularization strength must be finite and non-negative, got {0}")]
    InvalidRegularization(f64),

    #[error("row {row} has {found} entries, expected {expected}")]
    RaggedRows { row: usize, expected: usize, found: usize },

    #[error("matrix declares {expected} rows but holds {found}")]
    RowCount { expected: usize, found: usize },

    #[error("analytic gradient is {found:?}, expected {expected:?} to match the weights")]
    GradientShape { expected: (usize, usize), found: (usize, usize) },

    #[error("config error: {0}")]
    Config(String),
}

/// Result type for loss computations
pub type Result<T> = std::result::Result<T, LossError>;
