//! Professional Handlers
//!
//! HTTP handlers for the professional roster.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::UpsertProfessionalRequest;
use crate::application::services::{
    ProfessionalError, ProfessionalService, ProfessionalServiceImpl, UpsertProfessionalDto,
};
use crate::domain::entities::Professional;
use crate::infrastructure::repositories::PgProfessionalRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Helper to convert ProfessionalError to AppError
fn map_professional_error(e: ProfessionalError) -> AppError {
    match e {
        ProfessionalError::NotFound => AppError::NotFound("Professional not found".into()),
        ProfessionalError::Validation(msg) => AppError::BadRequest(msg),
        ProfessionalError::Internal(msg) => AppError::Internal(msg),
    }
}

fn build_service(state: &AppState) -> ProfessionalServiceImpl<PgProfessionalRepository> {
    ProfessionalServiceImpl::new(Arc::new(PgProfessionalRepository::new(state.db.clone())))
}

fn to_dto(body: UpsertProfessionalRequest) -> UpsertProfessionalDto {
    UpsertProfessionalDto {
        name: body.name,
        specialty: body.specialty,
        commission_rate: body.commission_rate,
    }
}

/// Add a professional
///
/// POST /api/v1/professionals
pub async fn create_professional(
    State(state): State<AppState>,
    Json(body): Json<UpsertProfessionalRequest>,
) -> Result<(StatusCode, Json<Professional>), AppError> {
    body.validate().map_err(validation_error)?;

    let professional = build_service(&state)
        .create(to_dto(body))
        .await
        .map_err(map_professional_error)?;

    Ok((StatusCode::CREATED, Json(professional)))
}

/// List professionals
///
/// GET /api/v1/professionals
pub async fn list_professionals(
    State(state): State<AppState>,
) -> Result<Json<Vec<Professional>>, AppError> {
    let professionals = build_service(&state)
        .list()
        .await
        .map_err(map_professional_error)?;

    Ok(Json(professionals))
}

/// Update a professional
///
/// PUT /api/v1/professionals/{professional_id}
pub async fn update_professional(
    State(state): State<AppState>,
    Path(professional_id): Path<Uuid>,
    Json(body): Json<UpsertProfessionalRequest>,
) -> Result<Json<Professional>, AppError> {
    body.validate().map_err(validation_error)?;

    let professional = build_service(&state)
        .update(professional_id, to_dto(body))
        .await
        .map_err(map_professional_error)?;

    Ok(Json(professional))
}

/// Remove a professional
///
/// DELETE /api/v1/professionals/{professional_id}
pub async fn delete_professional(
    State(state): State<AppState>,
    Path(professional_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    build_service(&state)
        .delete(professional_id)
        .await
        .map_err(map_professional_error)?;

    Ok(StatusCode::NO_CONTENT)
}
