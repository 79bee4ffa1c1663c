//! Error taxonomy for the analysis pipeline.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Raw input that cannot be turned into a batch of reviews.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedInputError {
    /// No column in the table header looks like review text.
    #[error("no text column found (columns: {columns})")]
    NoTextColumn { columns: String },

    /// An explicitly requested text column is absent.
    #[error("text column '{0}' not present in the table header")]
    MissingColumn(String),

    /// Every row or line was blank.
    #[error("input contains no reviews after dropping blank rows")]
    Empty,

    /// The table itself could not be parsed.
    #[error("table could not be parsed: {0}")]
    Table(String),
}

/// A review whose text cannot be scored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The text carries bytes that were not valid text in the source.
    #[error("review {review_id} contains text that could not be decoded")]
    Undecodable { review_id: usize },

    /// The scorer returned NaN or infinity.
    #[error("review {review_id} produced a non-finite polarity")]
    NonFinitePolarity { review_id: usize },
}

/// Too few reviews to synthesize insights from.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{total} reviews is below the {required} required for insights")]
pub struct InsufficientDataError {
    pub total: usize,
    pub required: usize,
}

/// Invalid analysis settings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid polarity thresholds ({negative}, {positive}): need -1 <= negative < positive <= 1")]
    InvalidThresholds { negative: f64, positive: f64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}

/// Pipeline step in which a batch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStep {
    Normalize,
    Classify,
}

impl fmt::Display for BatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStep::Normalize => write!(f, "normalize"),
            BatchStep::Classify => write!(f, "classify"),
        }
    }
}

/// Coarse error kind, for callers deciding whether to resubmit a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    Classification,
}

/// Underlying cause of a failed batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

/// A batch that did not produce a result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("batch failed during {stage}: {source}")]
pub struct BatchError {
    /// Step that was running when the batch failed.
    pub stage: BatchStep,
    #[source]
    pub source: StageError,
}

impl BatchError {
    pub fn new(stage: BatchStep, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.source {
            StageError::MalformedInput(_) => ErrorKind::MalformedInput,
            StageError::Classification(_) => ErrorKind::Classification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_carries_stage_and_kind() {
        let err = BatchError::new(BatchStep::Normalize, MalformedInputError::Empty);
        assert_eq!(err.stage, BatchStep::Normalize);
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert_eq!(
            err.to_string(),
            "batch failed during normalize: input contains no reviews after dropping blank rows"
        );
    }

    #[test]
    fn test_batch_error_source_chain() {
        let err = BatchError::new(
            BatchStep::Classify,
            ClassificationError::Undecodable { review_id: 3 },
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("review 3 contains text that could not be decoded")
        );
        assert_eq!(err.kind(), ErrorKind::Classification);
    }

    #[test]
    fn test_batch_step_names() {
        assert_eq!(BatchStep::Normalize.to_string(), "normalize");
        assert_eq!(BatchStep::Classify.to_string(), "classify");
        assert_eq!(serde_json::to_string(&BatchStep::Classify).unwrap(), "\"classify\"");
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = InsufficientDataError {
            total: 3,
            required: 5,
        };
        assert_eq!(err.to_string(), "3 reviews is below the 5 required for insights");
    }
}
