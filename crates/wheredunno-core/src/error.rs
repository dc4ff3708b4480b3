use thiserror::Error;

/// Top-level error type for wheredunno.
#[derive(Debug, Error)]
pub enum WhereError {
    /// Error from the text-completion provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from the message channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Storage error (message log or fact store).
    #[error("memory error: {0}")]
    Memory(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
