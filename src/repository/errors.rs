use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::attribute::{AttributeValueError, UnknownAttributeType};
use crate::domain::path::PathError;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures reported by the catalog repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    /// The path scheme cannot encode another sibling or level.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("category {id} still has {count} children")]
    HasChildren { id: i32, count: i32 },
    #[error("category {id} cannot be moved into its own subtree")]
    InvalidMove { id: i32 },
    /// Attribute declaration or value checks failed.
    #[error(transparent)]
    Value(#[from] AttributeValueError),
    /// Slug already taken; carries the table name.
    #[error("slug already in use in {0}")]
    DuplicateSlug(String),
    #[error("category path already in use: {0}")]
    DuplicatePath(String),
    /// Any other unique, foreign key or check constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
    /// A stored row could not be interpreted.
    #[error("invalid stored data: {0}")]
    InvalidData(String),
    #[error("database error: {0}")]
    Database(#[source] DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => classify_unique_violation(message),
                    DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::CheckViolation
                    | DatabaseErrorKind::NotNullViolation => RepositoryError::Conflict(message),
                    _ => RepositoryError::Database(DieselError::DatabaseError(kind, info)),
                }
            }
            other => RepositoryError::Database(other),
        }
    }
}

impl From<PathError> for RepositoryError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::Exhausted { .. } | PathError::TooDeep { .. } => {
                RepositoryError::CapacityExceeded(err.to_string())
            }
            PathError::Malformed(_) | PathError::InvalidScheme(_) => {
                RepositoryError::InvalidData(err.to_string())
            }
        }
    }
}

impl From<UnknownAttributeType> for RepositoryError {
    fn from(err: UnknownAttributeType) -> Self {
        RepositoryError::InvalidData(err.to_string())
    }
}

/// SQLite reports unique violations as `UNIQUE constraint failed: table.column`.
fn classify_unique_violation(message: String) -> RepositoryError {
    let columns = message
        .split_once(':')
        .map(|(_, columns)| columns.trim())
        .unwrap_or_default();

    match columns.split_once('.') {
        Some((table, "slug")) => RepositoryError::DuplicateSlug(table.to_string()),
        Some(("categories", "path")) => RepositoryError::DuplicatePath(message),
        _ => RepositoryError::Conflict(message),
    }
}
