use std::path::PathBuf;

/// Central error type for Lumen.
#[derive(Debug, thiserror::Error)]
pub enum LumenError {
    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("{path} is not a {expected}")]
    WrongType { path: String, expected: String },

    #[error("range not satisfiable (size {size})")]
    RangeUnsatisfiable { size: u64 },

    #[error("malformed range header: {header}")]
    MalformedRange { header: String },

    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("could not decode {path}")]
    Encoding { path: PathBuf },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LumenError {
    pub fn not_found(what: impl Into<String>) -> Self {
        LumenError::NotFound { what: what.into() }
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        LumenError::InvalidPath { path: path.into() }
    }

    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            LumenError::Io(_) | LumenError::Config { .. } | LumenError::Serialization(_)
        )
    }
}
