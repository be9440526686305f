use crate::domain::services::schedule::validate_schedule;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Optional pause inside a schedule window during which no slots are offered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BreakWindow {
    pub start: String,
    pub end: String,
}

/// One weekday's recurring offering: local "HH:MM" bounds plus an optional
/// break that must sit fully inside [start, end). Weekday 0 is Sunday.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub weekday: u8,
    pub start: String,
    pub end: String,
    #[serde(default, rename = "break", skip_serializing_if = "Option::is_none")]
    pub break_window: Option<BreakWindow>,
}

/// A bookable offering belonging to one shelter and one category. The weekly
/// schedule is persisted as a JSON document on the row, decoded on demand.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Service {
    pub id: String,
    pub shelter_id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub duration_min: i32,
    pub capacity: i32,
    pub cost_cents: i64,
    pub timezone: String,
    pub schedule_json: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewServiceParams {
    pub shelter_id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub duration_min: i32,
    pub capacity: i32,
    pub cost_cents: i64,
    pub timezone: String,
    pub windows: Vec<ScheduleWindow>,
}

impl Service {
    pub fn new(params: NewServiceParams) -> Result<Self, AppError> {
        if params.duration_min <= 0 {
            return Err(AppError::Validation("duration_min must be positive".into()));
        }
        if params.capacity <= 0 {
            return Err(AppError::Validation("capacity must be positive".into()));
        }
        if params.cost_cents < 0 {
            return Err(AppError::Validation("cost_cents must not be negative".into()));
        }
        validate_schedule(&params.windows)?;

        let schedule_json = serde_json::to_string(&params.windows)
            .map_err(|e| AppError::InvalidSchedule(format!("schedule not serializable: {e}")))?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            shelter_id: params.shelter_id,
            category_id: params.category_id,
            name: params.name,
            description: params.description,
            duration_min: params.duration_min,
            capacity: params.capacity,
            cost_cents: params.cost_cents,
            timezone: params.timezone,
            schedule_json,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn windows(&self) -> Result<Vec<ScheduleWindow>, AppError> {
        serde_json::from_str(&self.schedule_json)
            .map_err(|e| AppError::InvalidSchedule(format!("malformed schedule document: {e}")))
    }

    pub fn set_windows(&mut self, windows: &[ScheduleWindow]) -> Result<(), AppError> {
        validate_schedule(windows)?;
        self.schedule_json = serde_json::to_string(windows)
            .map_err(|e| AppError::InvalidSchedule(format!("schedule not serializable: {e}")))?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
