use crate::domain::{models::job::{Job, JOB_LEASE_SECS}, ports::JobRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use chrono::{DateTime, Duration, Utc};

/// Enqueues an outbox job on the caller's connection (inside its transaction).
pub(crate) async fn insert_job(conn: &mut SqliteConnection, job: &Job) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO jobs (id, job_type, booking_id, payload, execute_at, status, attempts, error_message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
        .bind(&job.id)
        .bind(&job.job_type)
        .bind(&job.booking_id)
        .bind(&job.payload)
        .bind(job.execute_at)
        .bind(job.status)
        .bind(job.attempts)
        .bind(&job.error_message)
        .bind(job.created_at)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

pub struct SqliteJobRepo {
    pool: SqlitePool,
}

impl SqliteJobRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl JobRepository for SqliteJobRepo {
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError> {
        // While PROCESSING, execute_at holds the lease deadline; an expired lease is claimable again.
        let now = Utc::now();
        let lease_until = now + Duration::seconds(JOB_LEASE_SECS);
        sqlx::query_as::<_, Job>(
            r#"UPDATE jobs SET status = 'PROCESSING', attempts = attempts + 1, execute_at = ?
               WHERE id IN (
                   SELECT id FROM jobs
                   WHERE status IN ('PENDING', 'PROCESSING') AND execute_at <= ?
                   ORDER BY execute_at ASC LIMIT ?
               )
               RETURNING *"#
        )
            .bind(lease_until)
            .bind(now)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE booking_id = ? ORDER BY created_at ASC"
        )
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_completed(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE jobs SET status = 'COMPLETED', error_message = NULL WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn schedule_retry(&self, id: &str, execute_at: DateTime<Utc>, error_message: String) -> Result<(), AppError> {
        sqlx::query("UPDATE jobs SET status = 'PENDING', execute_at = ?, error_message = ? WHERE id = ?")
            .bind(execute_at)
            .bind(error_message)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_failed(&self, id: &str, error_message: String) -> Result<(), AppError> {
        sqlx::query("UPDATE jobs SET status = 'FAILED', error_message = ? WHERE id = ?")
            .bind(error_message)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
