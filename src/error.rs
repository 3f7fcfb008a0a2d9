use thiserror::Error;

/// Result type for k-MST operations
pub type Result<T> = std::result::Result<T, KmstError>;

/// Errors that can occur while building, solving or persisting a k-MST
#[derive(Error, Debug)]
pub enum KmstError {
    /// Caller supplied malformed input (bad coordinates, k = 0, bad options)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The solver backend failed before producing a status
    #[error("Solver error: {0}")]
    Solver(String),

    /// Writing results failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding results failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KmstError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn solver(message: impl Into<String>) -> Self {
        Self::Solver(message.into())
    }
}
