use crate::domain::{
    models::schedule::{DailyLimitOverride, TimeOff, WeeklyScheduleSlot},
    ports::ScheduleRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepo {
    async fn create_slot(&self, slot: &WeeklyScheduleSlot) -> Result<WeeklyScheduleSlot, AppError> {
        sqlx::query_as::<_, WeeklyScheduleSlot>(
            r#"INSERT INTO weekly_slots (id, provider_id, day_of_week, start_time, end_time, booking_limit, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&slot.id)
            .bind(&slot.provider_id)
            .bind(slot.day_of_week)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(slot.booking_limit)
            .bind(slot.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_slots(&self, provider_id: &str, day_of_week: Option<i32>) -> Result<Vec<WeeklyScheduleSlot>, AppError> {
        sqlx::query_as::<_, WeeklyScheduleSlot>(
            r#"SELECT * FROM weekly_slots
               WHERE provider_id = ? AND (? IS NULL OR day_of_week = ?)
               ORDER BY day_of_week ASC, start_time ASC"#
        )
            .bind(provider_id)
            .bind(day_of_week)
            .bind(day_of_week)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_slot(&self, provider_id: &str, id: &str) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM weekly_slots WHERE provider_id = ? AND id = ?")
            .bind(provider_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_time_off(&self, time_off: &TimeOff) -> Result<TimeOff, AppError> {
        sqlx::query_as::<_, TimeOff>(
            r#"INSERT INTO time_offs (id, provider_id, date, start_time, end_time, reason, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&time_off.id)
            .bind(&time_off.provider_id)
            .bind(time_off.date)
            .bind(time_off.start_time)
            .bind(time_off.end_time)
            .bind(&time_off.reason)
            .bind(time_off.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_time_offs(&self, provider_id: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<TimeOff>, AppError> {
        sqlx::query_as::<_, TimeOff>(
            r#"SELECT * FROM time_offs
               WHERE provider_id = ?
               AND (? IS NULL OR date >= ?)
               AND (? IS NULL OR date <= ?)
               ORDER BY date ASC, start_time ASC"#
        )
            .bind(provider_id)
            .bind(from)
            .bind(from)
            .bind(to)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_time_off(&self, provider_id: &str, id: &str) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM time_offs WHERE provider_id = ? AND id = ?")
            .bind(provider_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }

    async fn upsert_daily_limit(&self, limit: &DailyLimitOverride) -> Result<DailyLimitOverride, AppError> {
        sqlx::query_as::<_, DailyLimitOverride>(
            r#"INSERT INTO daily_limits (provider_id, date, order_limit, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(provider_id, date) DO UPDATE SET
               order_limit=excluded.order_limit,
               updated_at=excluded.updated_at
               RETURNING *"#
        )
            .bind(&limit.provider_id)
            .bind(limit.date)
            .bind(limit.order_limit)
            .bind(limit.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_daily_limit(&self, provider_id: &str, date: NaiveDate) -> Result<Option<DailyLimitOverride>, AppError> {
        sqlx::query_as::<_, DailyLimitOverride>(
            "SELECT * FROM daily_limits WHERE provider_id = ? AND date = ?"
        )
            .bind(provider_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_daily_limits(&self, provider_id: &str) -> Result<Vec<DailyLimitOverride>, AppError> {
        sqlx::query_as::<_, DailyLimitOverride>(
            "SELECT * FROM daily_limits WHERE provider_id = ? ORDER BY date ASC"
        )
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_daily_limit(&self, provider_id: &str, date: NaiveDate) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM daily_limits WHERE provider_id = ? AND date = ?")
            .bind(provider_id)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }
}
