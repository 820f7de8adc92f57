//! Defines the error types shared by the catalog core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Length mismatch in '{op}': {left} rows vs {right} rows")]
    LengthMismatch { op: String, left: usize, right: usize },
    #[error("Type error: {0}")]
    TypeMismatch(String),
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),
    #[error("Invalid processing log: {0}")]
    InvalidLog(String),
    #[error("Cycle detected in processing log involving '{0}'")]
    CycleDetected(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Could not detect a {0} column")]
    MissingDimension(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
