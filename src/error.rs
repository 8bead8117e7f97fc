use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Insufficient data for {context}: need at least {required} draws, got {actual}")]
    InsufficientData {
        context: String,
        required: usize,
        actual: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out after {elapsed_ms} ms (budget {budget_ms} ms)")]
    Timeout { elapsed_ms: u64, budget_ms: u64 },

    #[error("Internal failure: {0}")]
    InternalFailure(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OracleError>;

/// The four error kinds exposed to callers of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InsufficientData,
    InvalidInput,
    Timeout,
    InternalFailure,
}

/// Structured `{kind, message}` error block returned across the API boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl OracleError {
    pub fn insufficient(context: impl Into<String>, required: usize, actual: usize) -> Self {
        OracleError::InsufficientData {
            context: context.into(),
            required,
            actual,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::InsufficientData { .. } => ErrorKind::InsufficientData,
            OracleError::InvalidInput(_)
            | OracleError::Configuration(_)
            | OracleError::Serde(_) => ErrorKind::InvalidInput,
            OracleError::Timeout { .. } => ErrorKind::Timeout,
            OracleError::InternalFailure(_)
            | OracleError::Model(_)
            | OracleError::Io(_)
            | OracleError::Polars(_) => ErrorKind::InternalFailure,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_reports_counts() {
        let err = OracleError::insufficient("ml", 60, 42);
        let report = err.report();
        assert_eq!(report.kind, ErrorKind::InsufficientData);
        assert!(report.message.contains("60"));
        assert!(report.message.contains("42"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            OracleError::Configuration("bad".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(OracleError::Model("x".into()).kind(), ErrorKind::InternalFailure);
        assert_eq!(
            OracleError::Timeout { elapsed_ms: 5, budget_ms: 1 }.kind(),
            ErrorKind::Timeout
        );
    }
}
