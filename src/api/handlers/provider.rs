use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::provider::ProviderId;
use crate::api::dtos::requests::{CreateProviderRequest, CreateStaffRequest};
use crate::domain::models::directory::{Provider, StaffMember};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_provider(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProviderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }

    let provider = state.provider_repo.create(&Provider::new(name.to_string())).await?;
    info!("Created provider {}", provider.id);
    Ok((StatusCode::CREATED, Json(provider)))
}

pub async fn get_provider(
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let provider = state.provider_repo.find_by_id(&provider_id).await?
        .ok_or(AppError::NotFound(format!("Provider {} not found", provider_id)))?;
    Ok(Json(provider))
}

pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
    Json(payload): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }

    let staff = state.staff_directory.create(&StaffMember::new(provider_id.clone(), name.to_string())).await?;
    info!("Added staff {} to provider {}", staff.id, provider_id);
    Ok((StatusCode::CREATED, Json(staff)))
}

pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    ProviderId(provider_id): ProviderId,
) -> Result<impl IntoResponse, AppError> {
    let staff = state.staff_directory.list_by_provider(&provider_id).await?;
    Ok(Json(staff))
}
