use thiserror::Error;

/// Main error type for the experiment pipeline.
///
/// Nothing is caught locally: every failure propagates to the binary, which
/// exits non-zero. A failing seed therefore aborts the whole batch.
#[derive(Error, Debug)]
pub enum SeqPairError {
    // I/O errors (missing dataset directory, unreadable files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Serialization errors (checkpoint sidecar)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Data errors
    #[error("unknown symbol '{symbol}' at position {position} (expected one of A, T, C, G)")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("Dataset error: {0}")]
    Dataset(String),

    // Checkpoint errors
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("unknown model kind tag: {0}")]
    UnknownModelKind(String),

    #[error("Record error: {0}")]
    Record(#[from] burn::record::RecorderError),

    // Tensor data extraction errors
    #[error("Numeric error: {0}")]
    Numeric(String),
}

/// Convenience result type
pub type Result<T> = std::result::Result<T, SeqPairError>;
