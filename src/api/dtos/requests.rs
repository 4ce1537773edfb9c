use crate::domain::models::timeline::ProofInput;
use crate::domain::services::booking_service::TransitionInput;
use crate::error::AppError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateProviderRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateStaffRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateSlotRequest {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub booking_limit: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreateTimeOffRequest {
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct SetDailyLimitRequest {
    pub order_limit: i32,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: String,
    pub service_id: String,
    pub booking_time: String,
    pub amount: Option<i64>,
    pub payment_id: Option<String>,
    pub voucher_id: Option<String>,
}

/// Body shared by every lifecycle endpoint; each one reads the fields it needs.
#[derive(Deserialize, Default)]
pub struct TransitionRequest {
    pub description: Option<String>,
    #[serde(default)]
    pub proofs: Vec<ProofInput>,
    pub staff_id: Option<String>,
    pub cancel_reason: Option<String>,
}

impl From<TransitionRequest> for TransitionInput {
    fn from(req: TransitionRequest) -> Self {
        TransitionInput {
            description: req.description,
            proofs: req.proofs,
            staff_id: req.staff_id,
            cancel_reason: req.cancel_reason,
        }
    }
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected YYYY-MM-DD)", field)))
}

pub fn parse_time(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected HH:MM)", field)))
}

/// Provider-local wall-clock instant, `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_instant(value: &str, field: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid {} (expected YYYY-MM-DDTHH:MM)", field)))
}
