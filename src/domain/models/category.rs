use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Classification metadata for services. Reference data: created once,
/// never mutated by the booking engine.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    pub requires_appointment: bool,
    pub max_duration_min: i32,
    pub advance_booking_days: i32,
    pub created_at: DateTime<Utc>,
}

impl ServiceCategory {
    pub fn new(
        name: String,
        requires_appointment: bool,
        max_duration_min: i32,
        advance_booking_days: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            requires_appointment,
            max_duration_min,
            advance_booking_days,
            created_at: Utc::now(),
        }
    }
}
