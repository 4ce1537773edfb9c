use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::models::schedule::{day_of_week, DailyLimitOverride, TimeOff, WeeklyScheduleSlot};
use crate::domain::ports::{BookingRepository, ProviderRepository, ScheduleRepository};
use crate::error::AppError;

/// Remaining capacity; `Unlimited` serializes as `null`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum Capacity {
    Limited(i64),
    Unlimited,
}

impl Capacity {
    pub fn from_limit(limit: Option<i32>, booked: i64) -> Self {
        match limit {
            Some(l) => Capacity::Limited((l as i64 - booked).max(0)),
            None => Capacity::Unlimited,
        }
    }

    pub fn has_room(&self) -> bool {
        match self {
            Capacity::Limited(n) => *n > 0,
            Capacity::Unlimited => true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnavailableReason {
    FullDayTimeOff,
    PartialTimeOff,
    OutsideSchedule,
    CapacityExhausted,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Availability {
    pub bookable: bool,
    pub remaining_capacity: Capacity,
    pub slot_id: Option<String>,
    pub reason: Option<UnavailableReason>,
}

impl Availability {
    fn closed(reason: UnavailableReason) -> Self {
        Self {
            bookable: false,
            remaining_capacity: Capacity::Limited(0),
            slot_id: None,
            reason: Some(reason),
        }
    }
}

/// Outcome of composing the schedule for one instant, before bookings are counted.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Closed(UnavailableReason),
    Open {
        slot: &'a WeeklyScheduleSlot,
        limit: Option<i32>,
    },
}

/// Everything the schedule says about one provider on one date.
#[derive(Debug, Clone, Default)]
pub struct DaySchedule {
    pub slots: Vec<WeeklyScheduleSlot>,
    pub time_offs: Vec<TimeOff>,
    pub daily_limit: Option<DailyLimitOverride>,
}

impl DaySchedule {
    pub fn resolve(&self, at: NaiveDateTime) -> Resolution<'_> {
        resolve(&self.slots, &self.time_offs, self.daily_limit.as_ref(), at)
    }
}

pub fn resolve<'a>(
    slots: &'a [WeeklyScheduleSlot],
    time_offs: &[TimeOff],
    override_rule: Option<&DailyLimitOverride>,
    at: NaiveDateTime,
) -> Resolution<'a> {
    let date = at.date();
    let time = at.time();
    let dow = day_of_week(date);

    let todays: Vec<&TimeOff> = time_offs.iter().filter(|t| t.date == date).collect();

    if todays.iter().any(|t| t.is_full_day()) {
        return Resolution::Closed(UnavailableReason::FullDayTimeOff);
    }
    if todays.iter().any(|t| t.blocks(time)) {
        return Resolution::Closed(UnavailableReason::PartialTimeOff);
    }

    let Some(slot) = slots.iter().find(|s| s.day_of_week == dow && s.contains(time)) else {
        return Resolution::Closed(UnavailableReason::OutsideSchedule);
    };

    // Hierarchy: Date Override > Slot Limit > Unlimited
    let limit = override_rule
        .filter(|o| o.date == date)
        .map(|o| o.order_limit)
        .or(slot.booking_limit);

    Resolution::Open { slot, limit }
}

pub fn availability_for(resolution: &Resolution<'_>, booked: i64) -> Availability {
    match resolution {
        Resolution::Closed(reason) => Availability::closed(*reason),
        Resolution::Open { slot, limit } => {
            let remaining = Capacity::from_limit(*limit, booked);
            let bookable = remaining.has_room();
            Availability {
                bookable,
                remaining_capacity: remaining,
                slot_id: Some(slot.id.clone()),
                reason: (!bookable).then_some(UnavailableReason::CapacityExhausted),
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BlockedRange {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindowAvailability {
    pub slot_id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub limit: Option<i32>,
    pub booked: i64,
    pub remaining_capacity: Capacity,
    pub blocked: Vec<BlockedRange>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub day_of_week: i32,
    pub closed: bool,
    pub windows: Vec<WindowAvailability>,
}

/// Calendar view of a date. `booked` maps slot id to its non-canceled booking count.
pub fn day_view(schedule: &DaySchedule, date: NaiveDate, booked: &HashMap<String, i64>) -> DayAvailability {
    let dow = day_of_week(date);
    let todays: Vec<&TimeOff> = schedule.time_offs.iter().filter(|t| t.date == date).collect();
    let override_limit = schedule
        .daily_limit
        .as_ref()
        .filter(|o| o.date == date)
        .map(|o| o.order_limit);

    let closed = todays.iter().any(|t| t.is_full_day()) || override_limit == Some(0);

    let mut slots: Vec<&WeeklyScheduleSlot> =
        schedule.slots.iter().filter(|s| s.day_of_week == dow).collect();
    slots.sort_by_key(|s| s.start_time);

    let windows = slots
        .into_iter()
        .map(|slot| {
            let limit = override_limit.or(slot.booking_limit);
            let count = booked.get(&slot.id).copied().unwrap_or(0);
            let remaining_capacity = if closed {
                Capacity::Limited(0)
            } else {
                Capacity::from_limit(limit, count)
            };

            let blocked = todays
                .iter()
                .filter_map(|t| {
                    let (start, end) = t.range()?;
                    (start < slot.end_time && slot.start_time < end).then(|| BlockedRange {
                        start_time: start.max(slot.start_time),
                        end_time: end.min(slot.end_time),
                        reason: t.reason.clone(),
                    })
                })
                .collect();

            WindowAvailability {
                slot_id: slot.id.clone(),
                start_time: slot.start_time,
                end_time: slot.end_time,
                limit,
                booked: count,
                remaining_capacity,
                blocked,
            }
        })
        .collect();

    DayAvailability {
        date,
        day_of_week: dow,
        closed,
        windows,
    }
}

/// Answers "bookable?" for a provider by composing the schedule store with booking counts.
pub struct AvailabilityEngine {
    provider_repo: Arc<dyn ProviderRepository>,
    schedule_repo: Arc<dyn ScheduleRepository>,
    booking_repo: Arc<dyn BookingRepository>,
}

impl AvailabilityEngine {
    pub fn new(
        provider_repo: Arc<dyn ProviderRepository>,
        schedule_repo: Arc<dyn ScheduleRepository>,
        booking_repo: Arc<dyn BookingRepository>,
    ) -> Self {
        Self { provider_repo, schedule_repo, booking_repo }
    }

    pub async fn ensure_provider(&self, provider_id: &str) -> Result<(), AppError> {
        self.provider_repo
            .find_by_id(provider_id)
            .await?
            .ok_or(AppError::NotFound(format!("Provider {} not found", provider_id)))?;
        Ok(())
    }

    pub async fn load_day(&self, provider_id: &str, date: NaiveDate) -> Result<DaySchedule, AppError> {
        let slots = self.schedule_repo.list_slots(provider_id, Some(day_of_week(date))).await?;
        let time_offs = self.schedule_repo.list_time_offs(provider_id, Some(date), Some(date)).await?;
        let daily_limit = self.schedule_repo.find_daily_limit(provider_id, date).await?;

        Ok(DaySchedule { slots, time_offs, daily_limit })
    }

    pub async fn count_booked(&self, provider_id: &str, date: NaiveDate, slot: &WeeklyScheduleSlot) -> Result<i64, AppError> {
        self.booking_repo
            .count_active_in_window(provider_id, date.and_time(slot.start_time), date.and_time(slot.end_time))
            .await
    }

    pub async fn is_bookable(&self, provider_id: &str, at: NaiveDateTime) -> Result<Availability, AppError> {
        self.ensure_provider(provider_id).await?;
        let schedule = self.load_day(provider_id, at.date()).await?;

        let resolution = schedule.resolve(at);
        let booked = match &resolution {
            Resolution::Open { slot, .. } => self.count_booked(provider_id, at.date(), slot).await?,
            Resolution::Closed(_) => 0,
        };

        Ok(availability_for(&resolution, booked))
    }

    pub async fn day_availability(&self, provider_id: &str, date: NaiveDate) -> Result<DayAvailability, AppError> {
        self.ensure_provider(provider_id).await?;
        let schedule = self.load_day(provider_id, date).await?;

        let mut booked = HashMap::new();
        for slot in &schedule.slots {
            let count = self.count_booked(provider_id, date, slot).await?;
            booked.insert(slot.id.clone(), count);
        }

        Ok(day_view(&schedule, date, &booked))
    }
}
