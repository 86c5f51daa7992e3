use sea_orm::error::DbErr;
use sea_orm::TransactionError;
use thiserror::Error;
use uuid::Uuid;

/// Error type shared by every service in the crate.
///
/// All variants are raised synchronously inside the transaction that
/// triggered them, so the persistence layer rolls back automatically.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Adjustment {0} has no lines")]
    EmptyAdjustment(Uuid),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Adjustment {0} is already applied")]
    AlreadyApplied(Uuid),

    #[error("Adjustment {0} is not applied")]
    NotApplied(Uuid),

    #[error("Adjustment not reversible: {0}")]
    NotReversible(String),

    #[error("Consistency error: {0}")]
    ConsistencyError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn db_error<E: Into<DbErr>>(err: E) -> Self {
        ServiceError::DatabaseError(err.into())
    }

    /// True for the adjustment-ledger state errors that callers may treat
    /// as a no-op retry rather than a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServiceError::AlreadyApplied(_) | ServiceError::NotApplied(_)
        )
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        }
    }
}
