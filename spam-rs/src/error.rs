//! Error types for spam-rs

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, SpamError>;

#[derive(Error, Debug)]
pub enum SpamError {
    /// Label value outside the fixed `{ham, spam}` set
    #[error("Invalid label: {0} (expected ham/0 or spam/1)")]
    InvalidLabel(String),

    /// A training record reached aggregation without a label
    #[error("Training record {index} has no label")]
    UnlabeledRecord { index: usize },

    #[error("Label set is empty")]
    EmptyLabelSet,

    #[error("Corpus contains no training examples")]
    NoTrainingExamples,

    /// Every training message had an empty body
    #[error("Corpus vocabulary is empty")]
    EmptyVocabulary,

    /// Statistics that break the corpus invariants
    #[error("Inconsistent corpus statistics: {0}")]
    InconsistentStatistics(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl SpamError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SpamError::Io {
            path: path.into(),
            source,
        }
    }
}
