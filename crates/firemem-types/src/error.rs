use thiserror::Error;

use crate::status::StatusKind;

/// Errors raised while resolving adapter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("project identifier is required")]
    MissingProject,

    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),

    #[error("failed to read settings: {0}")]
    Io(String),

    #[error("failed to parse settings: {0}")]
    Parse(String),
}

/// Errors from memory operations (used by the `Memory` trait in firemem-core).
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid key '{0}'")]
    InvalidKey(String),

    #[error("{kind}: {message}")]
    Status { kind: StatusKind, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("memory store is closed")]
    Closed,
}

impl MemoryError {
    /// The classified status kind, if this error came from the server.
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            Self::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the server reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        self.status_kind() == Some(StatusKind::NotFound)
    }
}
