//! Error types for the castle-warrior crate

use thiserror::Error;

/// Main error type for the castle-warrior crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid action index {index} (expected 0..{count})")]
    InvalidAction { index: usize, count: usize },

    #[error("grid state has no player cell")]
    MissingPlayer,

    #[error("episode is over; call reset before stepping again")]
    EpisodeOver,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid state key '{key}': {reason}")]
    InvalidStateKey { key: String, reason: String },

    #[error("value row for '{key}' has {got} entries, expected {expected}")]
    ActionRowLength {
        key: String,
        expected: usize,
        got: usize,
    },

    #[error("unsupported value table version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("no table stored under '{key}'")]
    TableNotFound { key: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
