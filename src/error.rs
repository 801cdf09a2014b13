use thiserror::Error;

// Unified error type for mpi-patterns

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("wire codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("classification failed for {source_id}: {reason}")]
    Classify { source_id: String, reason: String },
    #[error("protocol violation: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, PatternError>;
