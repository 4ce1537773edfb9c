use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::provider::ProviderId;
use crate::api::dtos::requests::{parse_date, parse_instant, CreateBookingRequest, TransitionRequest};
use crate::api::dtos::responses::TimelineResponse;
use crate::domain::services::booking_service::CreateBookingInput;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking_time = parse_instant(&payload.booking_time, "booking_time")?;
    info!("create_booking: provider {} at {}", provider_id, booking_time);

    let booking = state.booking_service.create_booking(CreateBookingInput {
        provider_id,
        customer_id: payload.customer_id,
        service_id: payload.service_id,
        booking_time,
        amount: payload.amount.unwrap_or(0),
        payment_id: payload.payment_id,
        voucher_id: payload.voucher_id,
    }).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date = params.get("date").map(|d| parse_date(d, "date")).transpose()?;
    let bookings = state.booking_service.list_bookings(&provider_id, date).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.get_booking(&booking_id).await?;
    Ok(Json(booking))
}

pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.get_booking(&booking_id).await?;
    let events = state.booking_service.timeline(&booking_id).await?;
    Ok(Json(TimelineResponse {
        booking_id: booking.id,
        code: booking.code,
        status: booking.status,
        events,
    }))
}

pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    payload: Option<Json<TransitionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.map(|Json(p)| p).unwrap_or_default().into();
    Ok(Json(state.booking_service.confirm(&booking_id, input).await?))
}

pub async fn assign_staff(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<TransitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.assign_staff(&booking_id, payload.into()).await?))
}

pub async fn start_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    payload: Option<Json<TransitionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.map(|Json(p)| p).unwrap_or_default().into();
    Ok(Json(state.booking_service.start(&booking_id, input).await?))
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    payload: Option<Json<TransitionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.map(|Json(p)| p).unwrap_or_default().into();
    Ok(Json(state.booking_service.complete(&booking_id, input).await?))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<TransitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.booking_service.cancel(&booking_id, payload.into()).await?))
}

pub async fn dispute_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    payload: Option<Json<TransitionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.map(|Json(p)| p).unwrap_or_default().into();
    Ok(Json(state.booking_service.raise_dispute(&booking_id, input).await?))
}
