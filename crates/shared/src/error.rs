use thiserror::Error;

/// Broad failure classes surfaced to the user. None of them are fatal: the
/// worst outcome anywhere in the app is inconsistent persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced form or response id does not exist.
    NotFound,
    /// User input was rejected (empty title, missing required answer).
    Validation,
    /// The persistence layer refused a write.
    Storage,
}

#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }
}
