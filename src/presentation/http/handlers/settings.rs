//! Settings Handlers
//!
//! HTTP handlers for the singleton salon settings document.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::services::{SettingsError, SettingsService, SettingsServiceImpl};
use crate::domain::entities::SalonSettings;
use crate::infrastructure::repositories::PgSettingsRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Helper to convert SettingsError to AppError
fn map_settings_error(e: SettingsError) -> AppError {
    match e {
        SettingsError::Validation(msg) => AppError::BadRequest(msg),
        SettingsError::Internal(msg) => AppError::Internal(msg),
    }
}

fn build_service(state: &AppState) -> SettingsServiceImpl<PgSettingsRepository> {
    SettingsServiceImpl::new(
        Arc::new(PgSettingsRepository::new(state.db.clone())),
        state.settings_cache.clone(),
    )
}

/// Read the salon settings, seeding defaults on first access
///
/// GET /api/v1/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<SalonSettings>, AppError> {
    let settings = build_service(&state)
        .get()
        .await
        .map_err(map_settings_error)?;

    Ok(Json(settings))
}

/// Replace the salon settings
///
/// PUT /api/v1/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<SalonSettings>,
) -> Result<Json<SalonSettings>, AppError> {
    let settings = build_service(&state)
        .update(body)
        .await
        .map_err(map_settings_error)?;

    Ok(Json(settings))
}
