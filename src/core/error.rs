//! Error types for the SMO trainer and classifier

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid kernel type \"{0}\": expected one of linear, poly, rbf, sigmoid")]
    InvalidKernel(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Training stopped after {iterations} iterations with duality gap {gap}")]
    NotConverged { iterations: usize, gap: f64 },

    #[error("Worker pool error: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, SVMError>;
