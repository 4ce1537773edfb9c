use crate::domain::{
    models::{booking::{Booking, BookingStatus}, job::Job, timeline::TrackingEvent},
    ports::BookingRepository,
};
use crate::error::AppError;
use crate::infra::repositories::sqlite_job_repo::insert_job;
use crate::infra::repositories::sqlite_timeline_repo::insert_tracking_event;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_admitted(&self, booking: &Booking, event: &TrackingEvent, jobs: Vec<Job>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, code, provider_id, customer_id, service_id, staff_id, booking_time, slot_start, slot_end, amount, status, payment_id, voucher_id, cancel_reason, confirmed_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.code).bind(&booking.provider_id).bind(&booking.customer_id)
            .bind(&booking.service_id).bind(&booking.staff_id).bind(booking.booking_time).bind(booking.slot_start)
            .bind(booking.slot_end).bind(booking.amount).bind(booking.status).bind(&booking.payment_id)
            .bind(&booking.voucher_id).bind(&booking.cancel_reason).bind(booking.confirmed_at)
            .bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        insert_tracking_event(&mut tx, event).await?;
        for job in &jobs {
            insert_job(&mut tx, job).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_provider(&self, provider_id: &str, date: Option<NaiveDate>) -> Result<Vec<Booking>, AppError> {
        match date {
            Some(d) => {
                let (start, end) = day_bounds(d)?;
                sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE provider_id = ? AND booking_time >= ? AND booking_time < ? ORDER BY booking_time ASC, created_at ASC")
                    .bind(provider_id).bind(start).bind(end)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            None => {
                sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE provider_id = ? ORDER BY booking_time ASC, created_at ASC")
                    .bind(provider_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
        }
    }

    async fn count_active_in_window(&self, provider_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE provider_id = ? AND booking_time >= ? AND booking_time < ? AND status != 'CANCELED'"
        )
            .bind(provider_id).bind(start).bind(end)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn apply_transition(&self, booking: &Booking, expected: BookingStatus, event: &TrackingEvent, jobs: Vec<Job>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = ?, staff_id = ?, cancel_reason = ?, confirmed_at = ?, updated_at = ?
             WHERE id = ? AND status = ?
             RETURNING *"
        )
            .bind(booking.status).bind(&booking.staff_id).bind(&booking.cancel_reason)
            .bind(booking.confirmed_at).bind(booking.updated_at)
            .bind(&booking.id).bind(expected)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let Some(updated) = updated else {
            let actual = sqlx::query_scalar::<_, BookingStatus>("SELECT status FROM bookings WHERE id = ?")
                .bind(&booking.id)
                .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
                .ok_or(AppError::NotFound(format!("Booking {} not found", booking.id)))?;
            return Err(AppError::InvalidTransition { from: actual, to: booking.status });
        };

        insert_tracking_event(&mut tx, event).await?;
        for job in &jobs {
            insert_job(&mut tx, job).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }
}

fn day_bounds(date: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime), AppError> {
    let start = date.and_time(NaiveTime::MIN);
    let end = start
        .checked_add_days(Days::new(1))
        .ok_or(AppError::InvalidRange(format!("date {} is out of range", date)))?;
    Ok((start, end))
}
