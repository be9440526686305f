use crate::domain::models::booking::BookingStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("No schedule window covers the requested time: {reason}")]
    OutOfSchedule {
        reason: String,
        capacity: i32,
        booked: i64,
    },
    #[error("Slot is fully booked ({booked}/{capacity})")]
    SlotUnavailable { capacity: i32, booked: i64 },
    #[error("Confirmation code generation exhausted after {attempts} attempts")]
    CodeGeneration { attempts: u32 },
    #[error("Cannot {action} a booking in status '{from}'")]
    InvalidTransition {
        from: BookingStatus,
        action: &'static str,
    },
    #[error("Booking was modified concurrently (current status: '{current}')")]
    ConcurrentModification { current: BookingStatus },
    #[error("Notification dispatch failed: {0}")]
    Notification(String),
}

/// True when the store rejected a write for a unique-constraint violation.
/// 2067 is SQLite's unique-constraint code, 23505 is PostgreSQL's.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let Some(db_err) = err.as_database_error() {
        let code = db_err.code().unwrap_or_default();
        return code == "2067" || code == "23505";
    }
    false
}
