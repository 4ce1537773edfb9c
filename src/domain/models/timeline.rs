use std::fmt;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingCode {
    Created,
    Confirmed,
    StaffAssigned,
    InProgress,
    Completed,
    Canceled,
    Disputed,
}

impl TrackingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingCode::Created => "CREATED",
            TrackingCode::Confirmed => "CONFIRMED",
            TrackingCode::StaffAssigned => "STAFF_ASSIGNED",
            TrackingCode::InProgress => "IN_PROGRESS",
            TrackingCode::Completed => "COMPLETED",
            TrackingCode::Canceled => "CANCELED",
            TrackingCode::Disputed => "DISPUTED",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrackingCode::Created => "Booking created",
            TrackingCode::Confirmed => "Booking confirmed",
            TrackingCode::StaffAssigned => "Staff assigned",
            TrackingCode::InProgress => "Service started",
            TrackingCode::Completed => "Service completed",
            TrackingCode::Canceled => "Booking canceled",
            TrackingCode::Disputed => "Booking disputed",
        }
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
    Video,
    Document,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct MediaProof {
    pub media_type: MediaType,
    pub url: String,
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub staff_id: Option<String>,
}

/// A proof as submitted by a caller; `uploaded_at` defaults to the recording time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProofInput {
    pub media_type: MediaType,
    pub url: String,
    pub caption: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub staff_id: Option<String>,
}

impl ProofInput {
    pub fn into_proof(self, now: DateTime<Utc>) -> MediaProof {
        MediaProof {
            media_type: self.media_type,
            url: self.url,
            caption: self.caption,
            uploaded_at: self.uploaded_at.unwrap_or(now),
            staff_id: self.staff_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct TrackingEvent {
    pub id: String,
    pub booking_id: String,
    pub seq: i64,
    pub time: DateTime<Utc>,
    pub code: TrackingCode,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(skip)]
    pub proofs: Vec<MediaProof>,
}

impl TrackingEvent {
    /// `seq` stays 0 until the store assigns the insertion position.
    pub fn new(
        booking_id: String,
        time: DateTime<Utc>,
        code: TrackingCode,
        description: Option<String>,
        proofs: Vec<MediaProof>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            seq: 0,
            time,
            code,
            title: code.title().to_string(),
            description,
            proofs,
        }
    }
}
