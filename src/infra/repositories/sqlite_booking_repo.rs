use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_within_capacity(
        &self,
        booking: &Booking,
        capacity: i32,
    ) -> Result<Booking, AppError> {
        // Guard and insert in one statement: SQLite runs it under a single
        // writer lock, so the overlap count cannot change between the
        // subquery and the insert.
        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, shelter_id, service_id, participant_id, start_time, end_time, status, confirmation_code, attendee_name, attendee_email, attendee_phone, emergency_contact, notes, provider_notes, cancellation_reason, outcome_attended, outcome_rating, outcome_feedback, outcome_follow_up, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE (SELECT COUNT(*) FROM bookings
                    WHERE service_id = ? AND status IN ('pending', 'confirmed')
                      AND start_time < ? AND end_time > ?) < ?
             RETURNING *",
        )
        .bind(&booking.id)
        .bind(&booking.shelter_id)
        .bind(&booking.service_id)
        .bind(&booking.participant_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status)
        .bind(&booking.confirmation_code)
        .bind(&booking.attendee_name)
        .bind(&booking.attendee_email)
        .bind(&booking.attendee_phone)
        .bind(&booking.emergency_contact)
        .bind(&booking.notes)
        .bind(&booking.provider_notes)
        .bind(&booking.cancellation_reason)
        .bind(booking.outcome_attended)
        .bind(booking.outcome_rating)
        .bind(&booking.outcome_feedback)
        .bind(booking.outcome_follow_up)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .bind(&booking.service_id)
        .bind(booking.end_time)
        .bind(booking.start_time)
        .bind(capacity)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        match created {
            Some(b) => Ok(b),
            None => {
                let booked = self
                    .count_active_overlap(&booking.service_id, booking.start_time, booking.end_time)
                    .await?;
                Err(AppError::SlotUnavailable { capacity, booked })
            }
        }
    }

    async fn find_by_id(&self, shelter_id: &str, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE shelter_id = ? AND id = ?")
            .bind(shelter_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE confirmation_code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active_in_range(
        &self,
        service_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE service_id = ? AND status IN ('pending', 'confirmed')
               AND start_time < ? AND end_time > ?",
        )
        .bind(service_id)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn count_active_overlap(
        &self,
        service_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings
             WHERE service_id = ? AND status IN ('pending', 'confirmed')
               AND start_time < ? AND end_time > ?",
        )
        .bind(service_id)
        .bind(end)
        .bind(start)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<Booking, AppError> {
        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings
             SET status = ?, provider_notes = ?, cancellation_reason = ?,
                 outcome_attended = ?, outcome_rating = ?, outcome_feedback = ?,
                 outcome_follow_up = ?, updated_at = ?
             WHERE id = ? AND shelter_id = ? AND status = ?
             RETURNING *",
        )
        .bind(booking.status)
        .bind(&booking.provider_notes)
        .bind(&booking.cancellation_reason)
        .bind(booking.outcome_attended)
        .bind(booking.outcome_rating)
        .bind(&booking.outcome_feedback)
        .bind(booking.outcome_follow_up)
        .bind(booking.updated_at)
        .bind(&booking.id)
        .bind(&booking.shelter_id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        match updated {
            Some(b) => Ok(b),
            None => match self.find_by_id(&booking.shelter_id, &booking.id).await? {
                Some(current) => Err(AppError::ConcurrentModification {
                    current: current.status,
                }),
                None => Err(AppError::NotFound("Booking not found".into())),
            },
        }
    }

    async fn list_by_participant(
        &self,
        shelter_id: &str,
        participant_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        let result = match status {
            Some(s) => {
                sqlx::query_as::<_, Booking>(
                    "SELECT * FROM bookings
                     WHERE shelter_id = ? AND participant_id = ? AND status = ?
                     ORDER BY start_time DESC",
                )
                .bind(shelter_id)
                .bind(participant_id)
                .bind(s)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Booking>(
                    "SELECT * FROM bookings
                     WHERE shelter_id = ? AND participant_id = ?
                     ORDER BY start_time DESC",
                )
                .bind(shelter_id)
                .bind(participant_id)
                .fetch_all(&self.pool)
                .await
            }
        };
        result.map_err(AppError::Database)
    }

    async fn list_by_shelter(
        &self,
        shelter_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        let result = match status {
            Some(s) => {
                sqlx::query_as::<_, Booking>(
                    "SELECT * FROM bookings WHERE shelter_id = ? AND status = ?
                     ORDER BY start_time DESC",
                )
                .bind(shelter_id)
                .bind(s)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Booking>(
                    "SELECT * FROM bookings WHERE shelter_id = ? ORDER BY start_time DESC",
                )
                .bind(shelter_id)
                .fetch_all(&self.pool)
                .await
            }
        };
        result.map_err(AppError::Database)
    }
}
