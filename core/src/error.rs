use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntelError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Empty result set or unknown id. Expected in normal operation.
    #[error("{0}")]
    NotFound(String),

    /// A statistic is undefined for the data at hand (e.g. percentile of nothing).
    #[error("Computation error: {0}")]
    Computation(String),

    /// The narrative generator failed; the underlying data was fine.
    #[error("Narrative generation failed: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type IntelResult<T> = Result<T, IntelError>;
