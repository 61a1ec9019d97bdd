//! Error types for sanad operations.
//!
//! Every domain failure maps onto a small taxonomy ([`ErrorKind`]) that the
//! JSON layer turns into an HTTP-style status code.

use crate::domain::{DependencyId, MilestoneId, ProjectId, UserId};
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for sanad operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Request data failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Predecessor and successor are the same milestone.
    #[error("A milestone cannot depend on itself: {0}")]
    SelfDependency(MilestoneId),

    /// An edge already exists for this ordered pair.
    #[error("Dependency already exists: {predecessor} -> {successor}")]
    DuplicateDependency {
        /// Predecessor of the existing edge
        predecessor: MilestoneId,
        /// Successor of the existing edge
        successor: MilestoneId,
    },

    /// The edge would close a directed cycle.
    #[error("Circular dependency detected: {predecessor} -> {successor} would create a cycle")]
    CycleDetected {
        /// Requested predecessor
        predecessor: MilestoneId,
        /// Requested successor
        successor: MilestoneId,
    },

    /// Milestone does not exist.
    #[error("Milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    /// Dependency edge does not exist.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// Project does not exist.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The acting user is not a member of the project.
    #[error("Access denied: {user} is not a member of project {project}")]
    AccessDenied {
        /// Acting user
        user: UserId,
        /// Project the user tried to touch
        project: ProjectId,
    },

    /// Storage backend error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Persisted data has an invalid shape.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// JSONL persistence failed.
    #[error("JSONL error: {0}")]
    Jsonl(#[from] sanad_jsonl::Error),

    /// No unique identifier could be generated.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),

    /// The transaction was already committed.
    #[error("Transaction is already committed")]
    TransactionClosed,

    /// The configured backend is not available.
    #[error("Unsupported storage backend: {0}")]
    UnsupportedBackend(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.sanad/` directory in the working directory or any parent.
    #[error("Not a sanad repository (or any parent directory). Run 'sanad init' first.")]
    NotInitialized,

    /// `.sanad/` already exists.
    #[error("sanad is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(String),

    /// Configuration values are invalid.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configuration file is not valid YAML.
    #[error("Configuration YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<sanad_jsonl::Error> for Error {
    fn from(e: sanad_jsonl::Error) -> Self {
        Error::Storage(StorageError::Jsonl(e))
    }
}

impl From<IdGenerationError> for Error {
    fn from(e: IdGenerationError) -> Self {
        Error::Storage(StorageError::IdGeneration(e))
    }
}

/// Client-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or self-referential ids, out-of-range fields, malformed input
    Validation,
    /// An edge already exists for the ordered pair
    DuplicateEdge,
    /// The edge would close a cycle
    CycleDetected,
    /// Milestone, edge, or project is absent
    NotFound,
    /// The caller lacks project access
    AccessDenied,
    /// Storage, IO, or configuration failure
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this category
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation | Self::DuplicateEdge | Self::CycleDetected => 400,
            Self::AccessDenied => 403,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::SelfDependency(_) => ErrorKind::Validation,
            Error::DuplicateDependency { .. } => ErrorKind::DuplicateEdge,
            Error::CycleDetected { .. } => ErrorKind::CycleDetected,
            Error::MilestoneNotFound(_)
            | Error::DependencyNotFound(_)
            | Error::ProjectNotFound(_) => ErrorKind::NotFound,
            Error::AccessDenied { .. } => ErrorKind::AccessDenied,
            Error::Storage(_) | Error::Config(_) | Error::Io(_) | Error::Json(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

/// A specialized Result type for sanad operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::validation(Error::Validation("bad".into()), 400)]
    #[case::self_dependency(Error::SelfDependency(MilestoneId::new("ms-a")), 400)]
    #[case::duplicate(
        Error::DuplicateDependency { predecessor: "ms-a".into(), successor: "ms-b".into() },
        400
    )]
    #[case::cycle(
        Error::CycleDetected { predecessor: "ms-a".into(), successor: "ms-b".into() },
        400
    )]
    #[case::access(Error::AccessDenied { user: "u".into(), project: "prj-1".into() }, 403)]
    #[case::milestone(Error::MilestoneNotFound("ms-x".into()), 404)]
    #[case::dependency(Error::DependencyNotFound("dep-x".into()), 404)]
    #[case::storage(Error::Storage(StorageError::TransactionClosed), 500)]
    fn test_status_codes(#[case] error: Error, #[case] expected: u16) {
        assert_eq!(error.status_code(), expected);
    }

    #[test]
    fn test_cycle_message_names_both_ends() {
        let err = Error::CycleDetected {
            predecessor: "ms-c".into(),
            successor: "ms-a".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ms-c -> ms-a"));
        assert!(msg.contains("cycle"));
    }
}
