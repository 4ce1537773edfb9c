use serde::{Deserialize, Serialize};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Day index used by weekly slots: 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct WeeklyScheduleSlot {
    pub id: String,
    pub provider_id: String,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub booking_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl WeeklyScheduleSlot {
    pub fn new(
        provider_id: String,
        day_of_week: i32,
        start_time: NaiveTime,
        end_time: NaiveTime,
        booking_limit: Option<i32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_id,
            day_of_week,
            start_time,
            end_time,
            booking_limit,
            created_at: Utc::now(),
        }
    }

    /// Half-open containment: `start` is inside the window, `end` is not.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct TimeOff {
    pub id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeOff {
    pub fn new(
        provider_id: String,
        date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_id,
            date,
            start_time,
            end_time,
            reason,
            created_at: Utc::now(),
        }
    }

    pub fn is_full_day(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none()
    }

    /// Partial bounds, if this is a partial-day exception.
    pub fn range(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn blocks(&self, time: NaiveTime) -> bool {
        if self.is_full_day() {
            return true;
        }
        self.range().is_some_and(|(start, end)| start <= time && time < end)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct DailyLimitOverride {
    pub provider_id: String,
    pub date: NaiveDate,
    pub order_limit: i32,
    pub updated_at: DateTime<Utc>,
}

impl DailyLimitOverride {
    pub fn new(provider_id: String, date: NaiveDate, order_limit: i32) -> Self {
        Self {
            provider_id,
            date,
            order_limit,
            updated_at: Utc::now(),
        }
    }
}
