//! Error types for risk adjustment.
//!
//! Two error families exist: [`InvalidInputError`] for malformed per-call
//! input, and [`ConfigError`] for threshold configuration problems found at
//! start-up. Neither is transient, so callers should never retry unchanged.

use thiserror::Error;

/// Result type for adjustment operations.
pub type AdjustResult<T> = Result<T, InvalidInputError>;

/// Errors raised when a probability vector, label mapping or risk score is
/// malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    /// The label mapping has no entries.
    #[error("Label mapping is empty")]
    EmptyMapping,

    /// Probability vector and label mapping disagree on the number of classes.
    #[error("Probability vector has {probabilities} entries but label mapping has {labels}")]
    LengthMismatch { probabilities: usize, labels: usize },

    /// A probability is below zero.
    #[error("Negative probability {value} at class index {index}")]
    NegativeProbability { index: usize, value: f64 },

    /// A probability is NaN or infinite.
    #[error("Non-finite probability {value} at class index {index}")]
    NonFiniteProbability { index: usize, value: f64 },

    /// Probabilities do not sum to 1.0 within tolerance.
    #[error("Probabilities sum to {sum}, expected 1.0 (tolerance {tolerance})")]
    SumOutOfTolerance { sum: f64, tolerance: f64 },

    /// Mapping indices are not exactly `0..N-1`.
    #[error("Label mapping is not dense: expected indices 0..{expected}, found index {found}")]
    NonDenseMapping { expected: usize, found: usize },

    /// The same class index appears twice.
    #[error("Class index {0} appears more than once in label mapping")]
    DuplicateIndex(usize),

    /// The same label is assigned to two classes.
    #[error("Label '{0}' is assigned to more than one class")]
    DuplicateLabel(String),

    /// The risk score is NaN.
    #[error("Risk score must be a number, got {0}")]
    NonFiniteRisk(f64),

    /// A batch has a different number of rows and risk scores.
    #[error("Batch has {rows} probability rows but {risk_scores} risk scores")]
    BatchLengthMismatch { rows: usize, risk_scores: usize },

    /// A row of a batch failed validation.
    #[error("Row {index}: {source}")]
    Row {
        index: usize,
        #[source]
        source: Box<InvalidInputError>,
    },
}

impl InvalidInputError {
    /// Wraps this error with the batch row it came from.
    pub fn in_row(self, index: usize) -> Self {
        InvalidInputError::Row {
            index,
            source: Box::new(self),
        }
    }
}

/// Errors that can occur while loading or validating threshold configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read threshold configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML threshold configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}
