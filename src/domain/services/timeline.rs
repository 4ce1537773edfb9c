use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::models::timeline::{MediaProof, TrackingCode, TrackingEvent};
use crate::domain::ports::TimelineRepository;
use crate::error::AppError;

/// Builds tracking events for the lifecycle and serves the read side.
/// Events are persisted by the lifecycle's own transaction, never here.
pub struct TimelineRecorder {
    repo: Arc<dyn TimelineRepository>,
}

impl TimelineRecorder {
    pub fn new(repo: Arc<dyn TimelineRepository>) -> Self {
        Self { repo }
    }

    /// Prepares the next event of a booking. The timestamp never goes backwards
    /// relative to what is already recorded. Callers hold the booking's lock.
    pub(crate) async fn next_event(
        &self,
        booking_id: &str,
        code: TrackingCode,
        description: Option<String>,
        proofs: Vec<MediaProof>,
    ) -> Result<TrackingEvent, AppError> {
        let last = self.repo.last_event_time(booking_id).await?;
        Ok(TrackingEvent::new(
            booking_id.to_string(),
            monotonic_now(Utc::now(), last),
            code,
            description,
            proofs,
        ))
    }

    pub async fn list(&self, booking_id: &str) -> Result<Vec<TrackingEvent>, AppError> {
        let mut events = self.repo.list_by_booking(booking_id).await?;
        // Stable: ties keep insertion order
        events.sort_by(|a, b| a.time.cmp(&b.time).then(a.seq.cmp(&b.seq)));
        Ok(events)
    }
}

fn monotonic_now(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}
