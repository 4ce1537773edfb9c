use crate::domain::models::booking::BookingStatus;
use crate::domain::models::timeline::TrackingEvent;
use crate::domain::services::availability::Availability;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub provider_id: String,
    pub at: NaiveDateTime,
    #[serde(flatten)]
    pub availability: Availability,
}

#[derive(Serialize)]
pub struct TimelineResponse {
    pub booking_id: String,
    pub code: String,
    pub status: BookingStatus,
    pub events: Vec<TrackingEvent>,
}
