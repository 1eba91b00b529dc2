use thiserror::Error;

/// Errors surfaced by the matching library.
///
/// Configuration problems are reported eagerly at construction time and are
/// kept distinct from runtime I/O failures so callers can tell a bad setup
/// apart from a bad input file.
#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Fuzzy hash cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

pub type MatcherResult<T> = Result<T, MatcherError>;
