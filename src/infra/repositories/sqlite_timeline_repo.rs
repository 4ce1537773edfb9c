use std::collections::HashMap;

use crate::domain::{
    models::timeline::{MediaProof, TrackingEvent},
    ports::TimelineRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

#[derive(FromRow)]
struct ProofRecord {
    event_id: String,
    #[sqlx(flatten)]
    proof: MediaProof,
}

/// Appends one event and its proofs on the caller's connection, so the lifecycle
/// can commit it together with the status change.
pub(crate) async fn insert_tracking_event(conn: &mut SqliteConnection, event: &TrackingEvent) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO tracking_events (id, booking_id, time, code, title, description) VALUES (?, ?, ?, ?, ?, ?)"
    )
        .bind(&event.id)
        .bind(&event.booking_id)
        .bind(event.time)
        .bind(event.code)
        .bind(&event.title)
        .bind(&event.description)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    for (position, proof) in event.proofs.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO tracking_proofs (event_id, position, media_type, url, caption, uploaded_at, staff_id)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        )
            .bind(&event.id)
            .bind(position as i64)
            .bind(proof.media_type)
            .bind(&proof.url)
            .bind(&proof.caption)
            .bind(proof.uploaded_at)
            .bind(&proof.staff_id)
            .execute(&mut *conn)
            .await
            .map_err(AppError::Database)?;
    }
    Ok(())
}

pub struct SqliteTimelineRepo {
    pool: SqlitePool,
}

impl SqliteTimelineRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl TimelineRepository for SqliteTimelineRepo {
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<TrackingEvent>, AppError> {
        let mut events = sqlx::query_as::<_, TrackingEvent>(
            "SELECT seq, id, booking_id, time, code, title, description FROM tracking_events WHERE booking_id = ? ORDER BY seq ASC"
        )
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let records = sqlx::query_as::<_, ProofRecord>(
            r#"SELECT p.event_id, p.media_type, p.url, p.caption, p.uploaded_at, p.staff_id
               FROM tracking_proofs p
               JOIN tracking_events e ON e.id = p.event_id
               WHERE e.booking_id = ?
               ORDER BY e.seq ASC, p.position ASC"#
        )
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut by_event: HashMap<String, Vec<MediaProof>> = HashMap::new();
        for record in records {
            by_event.entry(record.event_id).or_default().push(record.proof);
        }
        for event in &mut events {
            if let Some(proofs) = by_event.remove(&event.id) {
                event.proofs = proofs;
            }
        }
        Ok(events)
    }

    async fn last_event_time(&self, booking_id: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT time FROM tracking_events WHERE booking_id = ? ORDER BY seq DESC LIMIT 1"
        )
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
