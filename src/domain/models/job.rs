use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::models::timeline::TrackingCode;

pub const MAX_ATTEMPTS: i32 = 5;

/// How long a claimed job may stay `PROCESSING` before another worker may claim it again.
pub const JOB_LEASE_SECS: i64 = 300;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentAction {
    ReleaseEscrow,
    EvaluateRefund,
}

/// Message for the payment collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaymentNotice {
    pub booking_id: String,
    pub amount: i64,
    pub status: PaymentAction,
}

/// Message for the notification collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NotificationNotice {
    pub booking_id: String,
    pub recipient_id: String,
    pub event_code: TrackingCode,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPayload {
    Payment(PaymentNotice),
    Notification(NotificationNotice),
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: String,
    pub job_type: String, // "PAYMENT" or "NOTIFICATION"
    pub booking_id: String,
    pub payload: Json<JobPayload>,
    pub execute_at: DateTime<Utc>,
    pub status: JobStatus,
    pub attempts: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    fn new(payload: JobPayload, booking_id: String) -> Self {
        let job_type = match payload {
            JobPayload::Payment(_) => "PAYMENT",
            JobPayload::Notification(_) => "NOTIFICATION",
        };
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            job_type: job_type.to_string(),
            booking_id,
            payload: Json(payload),
            execute_at: now,
            status: JobStatus::Pending,
            attempts: 0,
            error_message: None,
            created_at: now,
        }
    }

    pub fn payment(booking_id: &str, amount: i64, status: PaymentAction) -> Self {
        Self::new(
            JobPayload::Payment(PaymentNotice {
                booking_id: booking_id.to_string(),
                amount,
                status,
            }),
            booking_id.to_string(),
        )
    }

    pub fn notification(booking_id: &str, recipient_id: &str, event_code: TrackingCode) -> Self {
        Self::new(
            JobPayload::Notification(NotificationNotice {
                booking_id: booking_id.to_string(),
                recipient_id: recipient_id.to_string(),
                event_code,
            }),
            booking_id.to_string(),
        )
    }

    /// Exponential backoff for the next delivery attempt: 10s, 20s, 40s, ...
    pub fn retry_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let exp = self.attempts.clamp(0, 10) as u32;
        now + Duration::seconds(10 * 2_i64.pow(exp))
    }
}
