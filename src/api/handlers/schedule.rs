use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::provider::ProviderId;
use crate::api::dtos::requests::{
    parse_date, parse_time, CreateSlotRequest, CreateTimeOffRequest, SetDailyLimitRequest,
};
use crate::domain::services::schedule_service::{NewSlot, NewTimeOff};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use serde_json::json;

pub async fn create_slot(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Json(payload): Json<CreateSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = NewSlot {
        day_of_week: payload.day_of_week,
        start_time: parse_time(&payload.start_time, "start_time")?,
        end_time: parse_time(&payload.end_time, "end_time")?,
        booking_limit: payload.booking_limit,
    };
    let slot = state.schedule_service.add_weekly_slot(&provider_id, new).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let day_of_week = params
        .get("day_of_week")
        .map(|d| d.parse::<i32>().map_err(|_| AppError::Validation("Invalid day_of_week".into())))
        .transpose()?;

    let slots = state.schedule_service.list_slots(&provider_id, day_of_week).await?;
    Ok(Json(slots))
}

pub async fn delete_slot(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Path((_, slot_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.schedule_service.remove_slot(&provider_id, &slot_id).await?;
    Ok(Json(json!({"status": "deleted"})))
}

pub async fn create_time_off(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Json(payload): Json<CreateTimeOffRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = NewTimeOff {
        date: parse_date(&payload.date, "date")?,
        start_time: payload.start_time.as_deref().map(|t| parse_time(t, "start_time")).transpose()?,
        end_time: payload.end_time.as_deref().map(|t| parse_time(t, "end_time")).transpose()?,
        reason: payload.reason,
    };
    let time_off = state.schedule_service.add_time_off(&provider_id, new).await?;
    Ok((StatusCode::CREATED, Json(time_off)))
}

pub async fn list_time_offs(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let from = params.get("from").map(|d| parse_date(d, "from")).transpose()?;
    let to = params.get("to").map(|d| parse_date(d, "to")).transpose()?;

    let time_offs = state.schedule_service.list_time_offs(&provider_id, from, to).await?;
    Ok(Json(time_offs))
}

pub async fn delete_time_off(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Path((_, time_off_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.schedule_service.remove_time_off(&provider_id, &time_off_id).await?;
    Ok(Json(json!({"status": "deleted"})))
}

pub async fn set_daily_limit(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Path((_, date_str)): Path<(String, String)>,
    Json(payload): Json<SetDailyLimitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date_str, "date")?;
    let saved = state.schedule_service.set_daily_limit(&provider_id, date, payload.order_limit).await?;
    Ok(Json(saved))
}

pub async fn clear_daily_limit(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Path((_, date_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date_str, "date")?;
    state.schedule_service.clear_daily_limit(&provider_id, date).await?;
    Ok(Json(json!({"status": "deleted"})))
}

pub async fn list_daily_limits(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
) -> Result<impl IntoResponse, AppError> {
    let limits = state.schedule_service.list_daily_limits(&provider_id).await?;
    Ok(Json(limits))
}
