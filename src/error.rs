//! Error types shared by the lock/SAT core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the lock data model, encoder, generator and verifier.
///
/// Unsatisfiable instances and oracle timeouts are outcomes, not errors;
/// see [`crate::sat::SolveOutcome`].
#[derive(Debug, Error)]
pub enum LockError {
    /// A lock instance failed structural validation
    #[error("Invalid lock instance: {0}")]
    InvalidInstance(String),

    /// A solution does not satisfy the instance it was checked against
    #[error("Invalid lock solution: {0}")]
    InvalidSolution(String),

    /// Persisted JSON is missing fields or has mistyped values
    #[error("Malformed persisted data: {0}")]
    MalformedPersistedData(String),

    /// The generator was asked for something it cannot build
    #[error("Invalid generator input: {0}")]
    InvalidGeneratorInput(String),

    /// The generate/encode/solve pipeline contradicted itself
    #[error("Internal consistency violation: {0}")]
    InternalConsistency(String),

    /// Satisfiable generation gave up
    #[error("No satisfiable instance found after {attempts} attempts")]
    RetriesExhausted { attempts: usize },

    /// The SAT backend failed
    #[error("SAT solver failure: {0}")]
    Solver(String),

    #[error("Failed to access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type LockResult<T> = std::result::Result<T, LockError>;

impl LockError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LockError::File {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_category() {
        let err = LockError::InvalidInstance("Duplicate binary pins detected".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid lock instance: Duplicate binary pins detected"
        );

        let err = LockError::RetriesExhausted { attempts: 3 };
        assert!(err.to_string().contains("3 attempts"));
    }

    #[test]
    fn test_file_error_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = LockError::file("instances/small.json", io);
        assert!(err.to_string().contains("instances/small.json"));
    }
}
