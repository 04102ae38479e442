//! Maps diesel/r2d2 failures into the core error types.

use liftlog_core::errors::{DatabaseError, Error};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Query failed: {0}")]
    Diesel(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Diesel(source) => {
                Error::Database(DatabaseError::QueryFailed(source.to_string()))
            }
            StorageError::Pool(source) => Error::Database(DatabaseError::Pool(source.to_string())),
        }
    }
}
