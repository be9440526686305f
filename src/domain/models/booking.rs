use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Lifecycle states of a booking. `Completed`, `Cancelled` and `NoShow` are
/// terminal; every transition between states goes through the named
/// operations on `BookingService`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact details captured at booking time. Stored as a snapshot on the
/// booking row so later profile edits do not rewrite history.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AttendeeInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Post-appointment record, attached only when a booking completes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Outcome {
    pub attended: bool,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub follow_up_required: bool,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub shelter_id: String,
    pub service_id: String,
    pub participant_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub confirmation_code: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub attendee_phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
    pub provider_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub outcome_attended: Option<bool>,
    pub outcome_rating: Option<i32>,
    pub outcome_feedback: Option<String>,
    pub outcome_follow_up: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub shelter_id: String,
    pub service_id: String,
    pub participant_id: String,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub attendee: AttendeeInfo,
    pub notes: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let end_time = params.start + chrono::Duration::minutes(params.duration_min as i64);
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            shelter_id: params.shelter_id,
            service_id: params.service_id,
            participant_id: params.participant_id,
            start_time: params.start,
            end_time,
            status: BookingStatus::Pending,
            confirmation_code: String::new(),
            attendee_name: params.attendee.name,
            attendee_email: params.attendee.email,
            attendee_phone: params.attendee.phone,
            emergency_contact: params.attendee.emergency_contact,
            notes: params.notes,
            provider_notes: None,
            cancellation_reason: None,
            outcome_attended: None,
            outcome_rating: None,
            outcome_feedback: None,
            outcome_follow_up: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn duration_min(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome_attended.map(|attended| Outcome {
            attended,
            rating: self.outcome_rating,
            feedback: self.outcome_feedback.clone(),
            follow_up_required: self.outcome_follow_up.unwrap_or(false),
        })
    }
}

pub const CONFIRMATION_CODE_LEN: usize = 8;

// Uppercase alphanumerics minus the lookalikes 0/O, 1/I, 5/S.
const CODE_ALPHABET: &[u8] = b"ACDEFGHJKMNPQRTUVWXYZ2346789";

/// Generates a short human-presentable confirmation code. Uniqueness is
/// enforced by the caller against existing bookings and by a unique index in
/// the store.
pub fn generate_confirmation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CONFIRMATION_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
