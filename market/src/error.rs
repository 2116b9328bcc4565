/// Domain-specific error types for the marketplace session core.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("Session service failed: {0}")]
    Session(String),

    #[error("Profile store failed: {0}")]
    ProfileStore(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MarketError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience type alias.
pub type MarketResult<T> = Result<T, MarketError>;
