//! Unified error types for TaskForge.

use thiserror::Error;

/// Result type alias using TaskForgeError.
pub type Result<T> = std::result::Result<T, TaskForgeError>;

#[derive(Error, Debug)]
pub enum TaskForgeError {
    // Reconciliation errors
    #[error("Candidate query failed: {0}")]
    Repository(String),

    #[error("Entity processing failed: {0}")]
    Entity(String),

    #[error("Persist failed: {0}")]
    Persist(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    // Notification errors
    #[error("Notification delivery failed: {0}")]
    Notification(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TaskForgeError {
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    pub fn entity(msg: impl Into<String>) -> Self {
        Self::Entity(msg.into())
    }

    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaskForgeError::Repository("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_error_constructors() {
        let e1 = TaskForgeError::repository("test");
        assert!(matches!(e1, TaskForgeError::Repository(_)));

        let e2 = TaskForgeError::persist("test");
        assert!(matches!(e2, TaskForgeError::Persist(_)));

        let e3 = TaskForgeError::notification("test");
        assert!(matches!(e3, TaskForgeError::Notification(_)));

        let e4 = TaskForgeError::store("test");
        assert!(matches!(e4, TaskForgeError::Store(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TaskForgeError = io_err.into();
        assert!(matches!(err, TaskForgeError::Io(_)));
    }
}
