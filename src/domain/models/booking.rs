use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    StaffAssigned,
    InProgress,
    Completed,
    Canceled,
    Disputed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 7] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::StaffAssigned,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Canceled,
        BookingStatus::Disputed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::StaffAssigned => "STAFF_ASSIGNED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Canceled => "CANCELED",
            BookingStatus::Disputed => "DISPUTED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that drive a booking through its lifecycle after creation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEvent {
    Confirm,
    AssignStaff,
    Start,
    Complete,
    Cancel,
    RaiseDispute,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        LifecycleEvent::Confirm,
        LifecycleEvent::AssignStaff,
        LifecycleEvent::Start,
        LifecycleEvent::Complete,
        LifecycleEvent::Cancel,
        LifecycleEvent::RaiseDispute,
    ];

    pub fn target(&self) -> BookingStatus {
        match self {
            LifecycleEvent::Confirm => BookingStatus::Confirmed,
            LifecycleEvent::AssignStaff => BookingStatus::StaffAssigned,
            LifecycleEvent::Start => BookingStatus::InProgress,
            LifecycleEvent::Complete => BookingStatus::Completed,
            LifecycleEvent::Cancel => BookingStatus::Canceled,
            LifecycleEvent::RaiseDispute => BookingStatus::Disputed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub code: String,
    pub provider_id: String,
    pub customer_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub booking_time: NaiveDateTime,
    pub slot_start: NaiveTime,
    pub slot_end: NaiveTime,
    pub amount: i64,
    pub status: BookingStatus,
    pub payment_id: Option<String>,
    pub voucher_id: Option<String>,
    pub cancel_reason: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub provider_id: String,
    pub customer_id: String,
    pub service_id: String,
    pub booking_time: NaiveDateTime,
    pub slot_start: NaiveTime,
    pub slot_end: NaiveTime,
    pub amount: i64,
    pub payment_id: Option<String>,
    pub voucher_id: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            code: format!("BK-{}", suffix),
            provider_id: params.provider_id,
            customer_id: params.customer_id,
            service_id: params.service_id,
            staff_id: None,
            booking_time: params.booking_time,
            slot_start: params.slot_start,
            slot_end: params.slot_end,
            amount: params.amount,
            status: BookingStatus::Pending,
            payment_id: params.payment_id,
            voucher_id: params.voucher_id,
            cancel_reason: None,
            confirmed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
