use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions};
use sqlx::{SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::ports::{NotificationService, PaymentService};
use crate::domain::services::{
    availability::AvailabilityEngine, booking_service::BookingService,
    schedule_service::ScheduleService, timeline::TimelineRecorder,
};
use crate::infra::collaborators::{
    http_notification_service::HttpNotificationService, http_payment_service::HttpPaymentService,
};
use crate::infra::repositories::{
    sqlite_booking_repo::SqliteBookingRepo, sqlite_job_repo::SqliteJobRepo,
    sqlite_provider_repo::SqliteProviderRepo, sqlite_schedule_repo::SqliteScheduleRepo,
    sqlite_staff_repo::SqliteStaffRepo, sqlite_timeline_repo::SqliteTimelineRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(AppError::Database)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .map_err(AppError::Database)?;

    run_sqlite_migrations(&pool).await?;

    let payment_service = Arc::new(HttpPaymentService::new(
        config.payment_service_url.clone(),
        config.collaborator_token.clone(),
    ));
    let notification_service = Arc::new(HttpNotificationService::new(
        config.notification_service_url.clone(),
        config.collaborator_token.clone(),
    ));

    Ok(assemble_state(config, pool, payment_service, notification_service))
}

/// Wires repositories and services over an already migrated pool.
pub fn assemble_state(
    config: &Config,
    pool: SqlitePool,
    payment_service: Arc<dyn PaymentService>,
    notification_service: Arc<dyn NotificationService>,
) -> AppState {
    let provider_repo = Arc::new(SqliteProviderRepo::new(pool.clone()));
    let staff_directory = Arc::new(SqliteStaffRepo::new(pool.clone()));
    let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
    let timeline_repo = Arc::new(SqliteTimelineRepo::new(pool.clone()));

    let schedule_service = Arc::new(ScheduleService::new(provider_repo.clone(), schedule_repo.clone()));
    let availability = Arc::new(AvailabilityEngine::new(
        provider_repo.clone(),
        schedule_repo.clone(),
        booking_repo.clone(),
    ));
    let recorder = Arc::new(TimelineRecorder::new(timeline_repo.clone()));
    let booking_service = Arc::new(BookingService::new(
        availability.clone(),
        booking_repo.clone(),
        staff_directory.clone(),
        recorder,
    ));

    AppState {
        config: config.clone(),
        provider_repo,
        staff_directory,
        schedule_repo,
        booking_repo,
        timeline_repo,
        job_repo: Arc::new(SqliteJobRepo::new(pool)),
        payment_service,
        notification_service,
        schedule_service,
        availability,
        booking_service,
    }
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run SQLite migrations: {}", e)))
}
