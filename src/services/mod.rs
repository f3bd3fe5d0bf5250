use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod categories;
pub mod products;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures reported by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submitted form failed validation or sanitization.
    #[error("invalid form: {0}")]
    Form(String),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}
