use sea_orm::DbErr;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Create was rejected because the email is already taken. Recoverable
    /// by the caller; carries the offending address.
    #[error("employee already exists with email {email}")]
    DuplicateEmail { email: String },
    /// Storage failure, propagated verbatim.
    #[error(transparent)]
    Store(#[from] DbErr),
}
