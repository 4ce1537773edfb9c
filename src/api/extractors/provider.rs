use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::collections::HashMap;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

/// The `{provider_id}` path segment, resolved against the provider store.
pub struct ProviderId(pub String);

impl FromRequestParts<Arc<AppState>> for ProviderId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(format!("Invalid path parameters: {}", e)))?;

        let provider_id = params
            .get("provider_id")
            .ok_or(AppError::Validation("provider_id is required".into()))?;

        state.provider_repo.find_by_id(provider_id).await?
            .ok_or(AppError::NotFound(format!("Provider {} not found", provider_id)))?;

        Ok(ProviderId(provider_id.clone()))
    }
}
