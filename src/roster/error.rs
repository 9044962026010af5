/// Typed storage errors
///
/// Integrity violations are translated here so that callers never see raw
/// driver text for expected failures.

use thiserror::Error;

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("collaborator not found: {0}")]
    CollaboratorNotFound(i64),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("collaborator {collaborator_id} already enrolled in project {project_id}")]
    AlreadyEnrolled { collaborator_id: i64, project_id: i64 },
    #[error("skill listed more than once: {0}")]
    DuplicateSkill(String),
    #[error("level rejected: expected one of beginner, intermediate, advanced")]
    LevelRejected,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err)
    }
}

/// Map a unique-constraint violation to `on_unique`, a CHECK violation to
/// `LevelRejected`, and anything else to `Database`.
pub(crate) fn classify(err: sqlx::Error, on_unique: impl FnOnce() -> StorageError) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return on_unique();
        }
        if db_err.is_check_violation() {
            return StorageError::LevelRejected;
        }
    }
    StorageError::from(err)
}

/// Like [`classify`], with a foreign-key violation mapped to `on_missing_parent`
pub(crate) fn classify_link(
    err: sqlx::Error,
    on_missing_parent: impl FnOnce() -> StorageError,
    on_unique: impl FnOnce() -> StorageError,
) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_foreign_key_violation() {
            return on_missing_parent();
        }
    }
    classify(err, on_unique)
}
