use chrono::{NaiveDate, NaiveTime};

use crate::domain::models::schedule::{TimeOff, WeeklyScheduleSlot};
use crate::error::AppError;

/// Half-open intervals `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`.
pub fn intervals_overlap<T: PartialOrd>(s1: T, e1: T, s2: T, e2: T) -> bool {
    s1 < e2 && s2 < e1
}

/// Windows never wrap past midnight, so `start >= end` is always malformed.
pub fn validate_window(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::InvalidRange(format!(
            "start {} must be before end {} (windows crossing midnight are not supported)",
            start.format("%H:%M"),
            end.format("%H:%M")
        )));
    }
    Ok(())
}

pub fn validate_day_of_week(day_of_week: i32) -> Result<(), AppError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AppError::InvalidValue(format!(
            "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {}",
            day_of_week
        )));
    }
    Ok(())
}

pub fn validate_limit(limit: i32, field: &str) -> Result<(), AppError> {
    if limit < 0 {
        return Err(AppError::InvalidValue(format!("{} must be >= 0, got {}", field, limit)));
    }
    Ok(())
}

pub fn check_slot_conflict(
    existing: &[WeeklyScheduleSlot],
    day_of_week: i32,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<(), AppError> {
    let clash = existing.iter().find(|slot| {
        slot.day_of_week == day_of_week
            && intervals_overlap(start, end, slot.start_time, slot.end_time)
    });

    if let Some(slot) = clash {
        return Err(AppError::OverlapConflict(format!(
            "{}-{} overlaps existing slot {} ({}-{})",
            start.format("%H:%M"),
            end.format("%H:%M"),
            slot.id,
            slot.start_time.format("%H:%M"),
            slot.end_time.format("%H:%M")
        )));
    }
    Ok(())
}

/// Either both bounds are present (partial day) or neither (full day).
pub fn validate_time_off_range(
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
) -> Result<(), AppError> {
    match (start, end) {
        (None, None) => Ok(()),
        (Some(s), Some(e)) => validate_window(s, e),
        _ => Err(AppError::InvalidRange(
            "time-off needs both start and end, or neither for a full day".into(),
        )),
    }
}

/// Rejects a time-off that exactly duplicates an existing one on the same date.
pub fn check_time_off_conflict(
    existing: &[TimeOff],
    date: NaiveDate,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
) -> Result<(), AppError> {
    let duplicate = existing
        .iter()
        .find(|t| t.date == date && t.start_time == start && t.end_time == end);

    if let Some(t) = duplicate {
        let what = if t.is_full_day() { "full-day" } else { "partial" };
        return Err(AppError::OverlapConflict(format!(
            "a {} time-off {} already exists on {}",
            what, t.id, date
        )));
    }
    Ok(())
}
