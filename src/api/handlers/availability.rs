use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::provider::ProviderId;
use crate::api::dtos::requests::{parse_date, parse_instant};
use crate::api::dtos::responses::AvailabilityResponse;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

/// `GET ...?at=YYYY-MM-DDTHH:MM` answers whether that instant can take one more booking.
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let at_str = params.get("at").ok_or(AppError::Validation("at required".into()))?;
    let at = parse_instant(at_str, "at")?;

    let availability = state.availability.is_bookable(&provider_id, at).await?;
    Ok(Json(AvailabilityResponse { provider_id, at, availability }))
}

pub async fn day_availability(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Path((_, date_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date_str, "date")?;
    let view = state.availability.day_availability(&provider_id, date).await?;
    Ok(Json(view))
}
