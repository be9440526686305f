use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_within_capacity(
        &self,
        booking: &Booking,
        capacity: i32,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock on the service serializes concurrent writers for the same
        // service, so the count below cannot go stale before the insert.
        sqlx::query("SELECT id FROM services WHERE id = $1 FOR UPDATE")
            .bind(&booking.service_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let booked = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings
             WHERE service_id = $1 AND status IN ('pending', 'confirmed')
               AND start_time < $2 AND end_time > $3",
        )
        .bind(&booking.service_id)
        .bind(booking.end_time)
        .bind(booking.start_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if booked >= capacity as i64 {
            tx.rollback().await.map_err(AppError::Database)?;
            return Err(AppError::SlotUnavailable { capacity, booked });
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, shelter_id, service_id, participant_id, start_time, end_time, status, confirmation_code, attendee_name, attendee_email, attendee_phone, emergency_contact, notes, provider_notes, cancellation_reason, outcome_attended, outcome_rating, outcome_feedback, outcome_follow_up, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
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
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, shelter_id: &str, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE shelter_id = $1 AND id = $2")
            .bind(shelter_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE confirmation_code = $1")
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
             WHERE service_id = $1 AND status IN ('pending', 'confirmed')
               AND start_time < $2 AND end_time > $3",
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
             WHERE service_id = $1 AND status IN ('pending', 'confirmed')
               AND start_time < $2 AND end_time > $3",
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
             SET status = $1, provider_notes = $2, cancellation_reason = $3,
                 outcome_attended = $4, outcome_rating = $5, outcome_feedback = $6,
                 outcome_follow_up = $7, updated_at = $8
             WHERE id = $9 AND shelter_id = $10 AND status = $11
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
                     WHERE shelter_id = $1 AND participant_id = $2 AND status = $3
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
                     WHERE shelter_id = $1 AND participant_id = $2
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
                    "SELECT * FROM bookings WHERE shelter_id = $1 AND status = $2
                     ORDER BY start_time DESC",
                )
                .bind(shelter_id)
                .bind(s)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Booking>(
                    "SELECT * FROM bookings WHERE shelter_id = $1 ORDER BY start_time DESC",
                )
                .bind(shelter_id)
                .fetch_all(&self.pool)
                .await
            }
        };
        result.map_err(AppError::Database)
    }
}
