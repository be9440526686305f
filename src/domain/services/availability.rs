use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::service::Service;
use crate::domain::models::slot::{Slot, SlotAvailability};
use crate::domain::ports::{BookingRepository, ServiceRepository};
use crate::domain::services::schedule::{validate_window, window_bounds, windows_for_weekday};
use crate::error::AppError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::warn;

const MINUTES_PER_DAY: i32 = 24 * 60;

fn service_tz(service: &Service) -> Tz {
    service.timezone.parse().unwrap_or_else(|_| {
        warn!(
            service_id = %service.id,
            timezone = %service.timezone,
            "unknown timezone, resolving schedule in UTC"
        );
        chrono_tz::UTC
    })
}

/// Resolves a service-local minute-of-day on `date` to a UTC instant.
/// Minute 1440 maps to midnight of the following day. Returns `None` when the
/// local time does not exist or is ambiguous (DST gaps and folds).
fn local_instant(tz: Tz, date: NaiveDate, minute: i32) -> Option<DateTime<Utc>> {
    let (date, minute) = if minute >= MINUTES_PER_DAY {
        (date.succ_opt()?, minute - MINUTES_PER_DAY)
    } else {
        (date, minute)
    };
    let time = NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)?;
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Number of non-terminal bookings whose interval overlaps [start, end).
/// Occupancy is always derived from the live booking set, never cached.
fn overlap_count(bookings: &[Booking], start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    bookings
        .iter()
        .filter(|b| {
            matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed)
                && b.start_time < end
                && b.end_time > start
        })
        .count() as i64
}

/// Enumerates candidate slots for `date`. The cursor starts at each window's
/// start and advances by `slot_duration_min`; a step that would overlap the
/// break is dropped whole and the cursor resumes at the break's end; a final
/// step that would extend past the window's end is dropped rather than
/// offered short. Deterministic for a fixed booking set, so two calls with no
/// intervening bookings yield identical output.
pub fn resolve_slots(
    service: &Service,
    date: NaiveDate,
    slot_duration_min: i32,
    existing_bookings: &[Booking],
) -> Result<Vec<Slot>, AppError> {
    if slot_duration_min <= 0 {
        return Err(AppError::Validation("slot duration must be positive".into()));
    }
    if !service.is_active {
        return Ok(Vec::new());
    }

    let tz = service_tz(service);
    let windows = service.windows()?;
    let mut slots: Vec<Slot> = Vec::new();

    for window in windows_for_weekday(&windows, date.weekday()) {
        validate_window(window)?;
        let (win_start, win_end, break_bounds) = window_bounds(window)?;

        let mut cursor = win_start;
        while cursor + slot_duration_min <= win_end {
            if let Some((break_start, break_end)) = break_bounds {
                if cursor < break_end && cursor + slot_duration_min > break_start {
                    cursor = break_end;
                    continue;
                }
            }

            if let Some(start_utc) = local_instant(tz, date, cursor) {
                let end_utc = start_utc + Duration::minutes(slot_duration_min as i64);
                let booked = overlap_count(existing_bookings, start_utc, end_utc);
                slots.push(Slot {
                    start_time: start_utc,
                    duration_min: slot_duration_min,
                    capacity: service.capacity,
                    booked_count: booked,
                    available: booked < service.capacity as i64,
                });
            }
            cursor += slot_duration_min;
        }
    }

    slots.sort_by_key(|s| s.start_time);
    slots.dedup_by_key(|s| s.start_time);
    Ok(slots)
}

/// Point-availability check for one interval, used to re-validate at booking
/// time. Fails with `OutOfSchedule` when no window on the instant's weekday
/// contains [instant, instant + duration) clear of its break.
pub fn check_availability(
    service: &Service,
    instant: DateTime<Utc>,
    duration_min: i32,
    existing_bookings: &[Booking],
) -> Result<SlotAvailability, AppError> {
    if duration_min <= 0 {
        return Err(AppError::Validation("duration must be positive".into()));
    }

    let tz = service_tz(service);
    let local = instant.with_timezone(&tz);
    let date = local.date_naive();
    let end = instant + Duration::minutes(duration_min as i64);

    let windows = service.windows()?;
    let mut covered = false;
    for window in windows_for_weekday(&windows, date.weekday()) {
        validate_window(window)?;
        let (win_start, win_end, break_bounds) = window_bounds(window)?;

        let (win_start_utc, win_end_utc) = match (
            local_instant(tz, date, win_start),
            local_instant(tz, date, win_end),
        ) {
            (Some(s), Some(e)) => (s, e),
            _ => continue,
        };
        if instant < win_start_utc || end > win_end_utc {
            continue;
        }

        if let Some((break_start, break_end)) = break_bounds {
            let intersects_break = match (
                local_instant(tz, date, break_start),
                local_instant(tz, date, break_end),
            ) {
                (Some(bs), Some(be)) => instant < be && end > bs,
                _ => false,
            };
            if intersects_break {
                continue;
            }
        }

        covered = true;
        break;
    }

    // An uncovered instant was never offered, so its occupancy is reported
    // as zero of zero rather than the service's capacity.
    if !covered {
        return Err(AppError::OutOfSchedule {
            reason: format!(
                "{} ({} min) is not within the service schedule",
                instant.to_rfc3339(),
                duration_min
            ),
            capacity: 0,
            booked: 0,
        });
    }

    let booked = overlap_count(existing_bookings, instant, end);
    Ok(SlotAvailability {
        available: booked < service.capacity as i64,
        capacity: service.capacity,
        booked_count: booked,
    })
}

/// Orchestrates the pure resolver over the repositories: fetches the live
/// booking set for the interval in question, then delegates.
pub struct AvailabilityService {
    services: Arc<dyn ServiceRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl AvailabilityService {
    pub fn new(services: Arc<dyn ServiceRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { services, bookings }
    }

    /// All candidate slots for a service on `date`, annotated with live
    /// occupancy. `slot_duration_min` defaults to the service duration.
    pub async fn slots_for_date(
        &self,
        shelter_id: &str,
        service_id: &str,
        date: NaiveDate,
        slot_duration_min: Option<i32>,
    ) -> Result<Vec<Slot>, AppError> {
        let service = self
            .services
            .find_by_id(shelter_id, service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

        let duration = slot_duration_min.unwrap_or(service.duration_min);
        let tz = service_tz(&service);

        // Bookings overlapping the local day, plus a day of margin on each
        // side so windows near midnight see their neighbours.
        let day_start = local_instant(tz, date, 0)
            .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()));
        let range_start = day_start - Duration::days(1);
        let range_end = day_start + Duration::days(2);
        let existing = self
            .bookings
            .list_active_in_range(&service.id, range_start, range_end)
            .await?;

        resolve_slots(&service, date, duration, &existing)
    }

    pub async fn check(
        &self,
        service: &Service,
        instant: DateTime<Utc>,
        duration_min: i32,
    ) -> Result<SlotAvailability, AppError> {
        let end = instant + Duration::minutes(duration_min as i64);
        let existing = self
            .bookings
            .list_active_in_range(&service.id, instant, end)
            .await?;
        check_availability(service, instant, duration_min, &existing)
    }

    /// Convenience variant that loads the service first.
    pub async fn check_service(
        &self,
        shelter_id: &str,
        service_id: &str,
        instant: DateTime<Utc>,
        duration_min: Option<i32>,
    ) -> Result<SlotAvailability, AppError> {
        let service = self
            .services
            .find_by_id(shelter_id, service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".into()))?;
        let duration = duration_min.unwrap_or(service.duration_min);
        self.check(&service, instant, duration).await
    }
}
