use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A derived candidate booking interval. Never persisted; recomputed from the
/// schedule and the live booking set on every resolution.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Slot {
    pub start_time: DateTime<Utc>,
    pub duration_min: i32,
    pub capacity: i32,
    pub booked_count: i64,
    pub available: bool,
}

/// Point-availability answer for a single (instant, duration) interval.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    pub available: bool,
    pub capacity: i32,
    pub booked_count: i64,
}
