use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::domain::models::schedule::{DailyLimitOverride, TimeOff, WeeklyScheduleSlot};
use crate::domain::ports::{ProviderRepository, ScheduleRepository};
use crate::domain::services::conflict::{
    check_slot_conflict, check_time_off_conflict, validate_day_of_week, validate_limit,
    validate_time_off_range, validate_window,
};
use crate::domain::services::locks::KeyedLocks;
use crate::error::AppError;

/// Serialization scope for validate-then-insert on the schedule store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScheduleScope {
    Weekday(String, i32),
    Date(String, NaiveDate),
}

pub struct NewSlot {
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub booking_limit: Option<i32>,
}

pub struct NewTimeOff {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

pub struct ScheduleService {
    provider_repo: Arc<dyn ProviderRepository>,
    repo: Arc<dyn ScheduleRepository>,
    locks: KeyedLocks<ScheduleScope>,
}

impl ScheduleService {
    pub fn new(provider_repo: Arc<dyn ProviderRepository>, repo: Arc<dyn ScheduleRepository>) -> Self {
        Self {
            provider_repo,
            repo,
            locks: KeyedLocks::new(),
        }
    }

    async fn ensure_provider(&self, provider_id: &str) -> Result<(), AppError> {
        self.provider_repo
            .find_by_id(provider_id)
            .await?
            .ok_or(AppError::NotFound(format!("Provider {} not found", provider_id)))?;
        Ok(())
    }

    pub async fn add_weekly_slot(&self, provider_id: &str, new: NewSlot) -> Result<WeeklyScheduleSlot, AppError> {
        validate_day_of_week(new.day_of_week)?;
        validate_window(new.start_time, new.end_time)?;
        if let Some(limit) = new.booking_limit {
            validate_limit(limit, "booking_limit")?;
        }
        self.ensure_provider(provider_id).await?;

        let scope = ScheduleScope::Weekday(provider_id.to_string(), new.day_of_week);
        let _guard = self.locks.lock(&scope).await;

        let existing = self.repo.list_slots(provider_id, Some(new.day_of_week)).await?;
        check_slot_conflict(&existing, new.day_of_week, new.start_time, new.end_time)?;

        let slot = WeeklyScheduleSlot::new(
            provider_id.to_string(),
            new.day_of_week,
            new.start_time,
            new.end_time,
            new.booking_limit,
        );
        let created = self.repo.create_slot(&slot).await?;

        info!(
            "Added weekly slot {} for provider {} (day {}, {}-{})",
            created.id, provider_id, created.day_of_week, created.start_time, created.end_time
        );
        Ok(created)
    }

    pub async fn add_time_off(&self, provider_id: &str, new: NewTimeOff) -> Result<TimeOff, AppError> {
        validate_time_off_range(new.start_time, new.end_time)?;
        self.ensure_provider(provider_id).await?;

        let scope = ScheduleScope::Date(provider_id.to_string(), new.date);
        let _guard = self.locks.lock(&scope).await;

        let existing = self.repo.list_time_offs(provider_id, Some(new.date), Some(new.date)).await?;
        check_time_off_conflict(&existing, new.date, new.start_time, new.end_time)?;

        let time_off = TimeOff::new(
            provider_id.to_string(),
            new.date,
            new.start_time,
            new.end_time,
            new.reason,
        );
        let created = self.repo.create_time_off(&time_off).await?;

        info!("Added time-off {} for provider {} on {}", created.id, provider_id, created.date);
        Ok(created)
    }

    pub async fn set_daily_limit(&self, provider_id: &str, date: NaiveDate, limit: i32) -> Result<DailyLimitOverride, AppError> {
        validate_limit(limit, "order_limit")?;
        self.ensure_provider(provider_id).await?;

        let saved = self
            .repo
            .upsert_daily_limit(&DailyLimitOverride::new(provider_id.to_string(), date, limit))
            .await?;

        info!("Set daily limit {} for provider {} on {}", limit, provider_id, date);
        Ok(saved)
    }

    pub async fn clear_daily_limit(&self, provider_id: &str, date: NaiveDate) -> Result<(), AppError> {
        if self.repo.delete_daily_limit(provider_id, date).await? {
            info!("Cleared daily limit for provider {} on {}", provider_id, date);
        }
        Ok(())
    }

    pub async fn remove_slot(&self, provider_id: &str, slot_id: &str) -> Result<(), AppError> {
        if self.repo.delete_slot(provider_id, slot_id).await? {
            info!("Removed weekly slot {} for provider {}", slot_id, provider_id);
        }
        Ok(())
    }

    pub async fn remove_time_off(&self, provider_id: &str, time_off_id: &str) -> Result<(), AppError> {
        if self.repo.delete_time_off(provider_id, time_off_id).await? {
            info!("Removed time-off {} for provider {}", time_off_id, provider_id);
        }
        Ok(())
    }

    pub async fn list_slots(&self, provider_id: &str, day_of_week: Option<i32>) -> Result<Vec<WeeklyScheduleSlot>, AppError> {
        if let Some(day) = day_of_week {
            validate_day_of_week(day)?;
        }
        self.repo.list_slots(provider_id, day_of_week).await
    }

    pub async fn list_time_offs(&self, provider_id: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<TimeOff>, AppError> {
        if let (Some(f), Some(t)) = (from, to)
            && f > t {
            return Err(AppError::InvalidRange(format!("from {} is after to {}", f, t)));
        }
        self.repo.list_time_offs(provider_id, from, to).await
    }

    pub async fn list_daily_limits(&self, provider_id: &str) -> Result<Vec<DailyLimitOverride>, AppError> {
        self.repo.list_daily_limits(provider_id).await
    }

    pub fn prune_idle_locks(&self) -> usize {
        self.locks.prune_idle()
    }
}
