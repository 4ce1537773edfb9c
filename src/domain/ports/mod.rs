use crate::domain::models::{
    booking::{Booking, BookingStatus},
    directory::{Provider, StaffMember},
    job::{Job, NotificationNotice, PaymentNotice},
    schedule::{DailyLimitOverride, TimeOff, WeeklyScheduleSlot},
    timeline::TrackingEvent,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn create(&self, provider: &Provider) -> Result<Provider, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Provider>, AppError>;
}

/// Staff directory consulted when a booking gets a staff member assigned.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn create(&self, staff: &StaffMember) -> Result<StaffMember, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<StaffMember>, AppError>;
    async fn list_by_provider(&self, provider_id: &str) -> Result<Vec<StaffMember>, AppError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create_slot(&self, slot: &WeeklyScheduleSlot) -> Result<WeeklyScheduleSlot, AppError>;
    async fn list_slots(&self, provider_id: &str, day_of_week: Option<i32>) -> Result<Vec<WeeklyScheduleSlot>, AppError>;
    /// Returns whether a row was removed.
    async fn delete_slot(&self, provider_id: &str, id: &str) -> Result<bool, AppError>;

    async fn create_time_off(&self, time_off: &TimeOff) -> Result<TimeOff, AppError>;
    async fn list_time_offs(&self, provider_id: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<TimeOff>, AppError>;
    async fn delete_time_off(&self, provider_id: &str, id: &str) -> Result<bool, AppError>;

    async fn upsert_daily_limit(&self, limit: &DailyLimitOverride) -> Result<DailyLimitOverride, AppError>;
    async fn find_daily_limit(&self, provider_id: &str, date: NaiveDate) -> Result<Option<DailyLimitOverride>, AppError>;
    async fn list_daily_limits(&self, provider_id: &str) -> Result<Vec<DailyLimitOverride>, AppError>;
    async fn delete_daily_limit(&self, provider_id: &str, date: NaiveDate) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts a freshly admitted booking with its CREATED event and outbox jobs in one transaction.
    async fn create_admitted(&self, booking: &Booking, event: &TrackingEvent, jobs: Vec<Job>) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_provider(&self, provider_id: &str, date: Option<NaiveDate>) -> Result<Vec<Booking>, AppError>;
    /// Non-canceled bookings with `start <= booking_time < end`.
    async fn count_active_in_window(&self, provider_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Result<i64, AppError>;
    /// Writes `booking` only if the stored status still equals `expected`, together with
    /// the tracking event and outbox jobs. Returns `InvalidTransition` when the guard fails.
    async fn apply_transition(&self, booking: &Booking, expected: BookingStatus, event: &TrackingEvent, jobs: Vec<Job>) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait TimelineRepository: Send + Sync {
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<TrackingEvent>, AppError>;
    async fn last_event_time(&self, booking_id: &str) -> Result<Option<DateTime<Utc>>, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError>;
    async fn mark_completed(&self, id: &str) -> Result<(), AppError>;
    async fn schedule_retry(&self, id: &str, execute_at: DateTime<Utc>, error_message: String) -> Result<(), AppError>;
    async fn mark_failed(&self, id: &str, error_message: String) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn notify(&self, notice: &PaymentNotice) -> Result<(), AppError>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify(&self, notice: &NotificationNotice) -> Result<(), AppError>;
}
