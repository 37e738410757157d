use thiserror::Error;

/// Failures surfaced by the record store and the registration flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A submitted field was missing or empty.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The backend could not be reached or answered with a server error.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered but did not store the row.
    #[error("backend rejected the write: {0}")]
    WriteRejected(String),
}

impl RegistryError {
    pub fn unavailable(e: impl std::fmt::Display) -> Self {
        Self::BackendUnavailable(e.to_string())
    }

    pub fn rejected(e: impl std::fmt::Display) -> Self {
        Self::WriteRejected(e.to_string())
    }
}
