use crate::domain::models::service::ScheduleWindow;
use crate::error::AppError;
use chrono::{NaiveTime, Timelike, Weekday};

const MINUTES_PER_DAY: i32 = 24 * 60;

pub fn parse_hhmm(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::InvalidSchedule(format!("'{value}' is not a valid HH:MM time")))
}

fn minute_of_day(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

/// Minute-of-day bounds of a window: `(start, end, break)`. A window ending
/// at 23:59 is treated as running to midnight, so the last minute of the day
/// is bookable.
pub fn window_bounds(window: &ScheduleWindow) -> Result<(i32, i32, Option<(i32, i32)>), AppError> {
    let start = minute_of_day(parse_hhmm(&window.start)?);
    let mut end = minute_of_day(parse_hhmm(&window.end)?);
    if end == MINUTES_PER_DAY - 1 {
        end = MINUTES_PER_DAY;
    }

    let break_bounds = match &window.break_window {
        Some(b) => Some((
            minute_of_day(parse_hhmm(&b.start)?),
            minute_of_day(parse_hhmm(&b.end)?),
        )),
        None => None,
    };

    Ok((start, end, break_bounds))
}

/// Rejects malformed windows: weekday out of range, unparseable times,
/// start >= end, or a break not strictly contained in [start, end).
pub fn validate_window(window: &ScheduleWindow) -> Result<(), AppError> {
    if window.weekday > 6 {
        return Err(AppError::InvalidSchedule(format!(
            "weekday {} out of range (0 = Sunday .. 6 = Saturday)",
            window.weekday
        )));
    }

    let (start, end, break_bounds) = window_bounds(window)?;
    if start >= end {
        return Err(AppError::InvalidSchedule(format!(
            "window start {} must precede end {}",
            window.start, window.end
        )));
    }

    if let Some((break_start, break_end)) = break_bounds {
        if break_start >= break_end || break_start < start || break_end > end {
            return Err(AppError::InvalidSchedule(format!(
                "break must fall inside the window {}-{}",
                window.start, window.end
            )));
        }
    }

    Ok(())
}

pub fn validate_schedule(windows: &[ScheduleWindow]) -> Result<(), AppError> {
    for window in windows {
        validate_window(window)?;
    }
    Ok(())
}

/// All windows offered on the given weekday. Split shifts appear as multiple
/// windows with the same weekday.
pub fn windows_for_weekday(windows: &[ScheduleWindow], weekday: Weekday) -> Vec<&ScheduleWindow> {
    let day = weekday.num_days_from_sunday() as u8;
    windows.iter().filter(|w| w.weekday == day).collect()
}
