//! Slots service errors.

use despatch::calendar::CalendarError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotsServiceError {
    #[error("slot not found")]
    NotFound,

    #[error("invalid slot data")]
    InvalidData,

    #[error("date arithmetic out of range")]
    Calendar(#[from] CalendarError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for SlotsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            Some(_) | None => Self::Sql(error),
        }
    }
}
