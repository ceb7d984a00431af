//! Client Handlers
//!
//! HTTP handlers for client records and the loyalty card.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::UpsertClientRequest;
use crate::application::services::{
    ClientError, ClientService, ClientServiceImpl, LoyaltySummaryDto, UpsertClientDto,
};
use crate::domain::entities::Client;
use crate::infrastructure::repositories::PgClientRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Helper to convert ClientError to AppError
fn map_client_error(e: ClientError) -> AppError {
    match e {
        ClientError::NotFound => AppError::NotFound("Client not found".into()),
        ClientError::DuplicateName => {
            AppError::Conflict("A client with this name already exists".into())
        }
        ClientError::NoMimoAvailable => {
            AppError::BadRequest("Client has no mimo available to redeem".into())
        }
        ClientError::Validation(msg) => AppError::BadRequest(msg),
        ClientError::Internal(msg) => AppError::Internal(msg),
    }
}

fn build_service(state: &AppState) -> ClientServiceImpl<PgClientRepository> {
    ClientServiceImpl::new(Arc::new(PgClientRepository::new(state.db.clone())))
}

fn to_dto(body: UpsertClientRequest) -> UpsertClientDto {
    UpsertClientDto {
        name: body.name,
        email: body.email,
        phone: body.phone,
    }
}

/// Register a client
///
/// POST /api/v1/clients
pub async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<UpsertClientRequest>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    body.validate().map_err(validation_error)?;

    let client = build_service(&state)
        .create(to_dto(body))
        .await
        .map_err(map_client_error)?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// List all clients
///
/// GET /api/v1/clients
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, AppError> {
    let clients = build_service(&state).list().await.map_err(map_client_error)?;

    Ok(Json(clients))
}

/// Get a single client
///
/// GET /api/v1/clients/{client_id}
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let client = build_service(&state)
        .get(client_id)
        .await
        .map_err(map_client_error)?;

    Ok(Json(client))
}

/// Update a client
///
/// PUT /api/v1/clients/{client_id}
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Json(body): Json<UpsertClientRequest>,
) -> Result<Json<Client>, AppError> {
    body.validate().map_err(validation_error)?;

    let client = build_service(&state)
        .update(client_id, to_dto(body))
        .await
        .map_err(map_client_error)?;

    Ok(Json(client))
}

/// Delete a client
///
/// DELETE /api/v1/clients/{client_id}
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    build_service(&state)
        .delete(client_id)
        .await
        .map_err(map_client_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Loyalty card summary with owned package instances
///
/// GET /api/v1/clients/{client_id}/loyalty
pub async fn loyalty_summary(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<LoyaltySummaryDto>, AppError> {
    let summary = build_service(&state)
        .loyalty_summary(client_id)
        .await
        .map_err(map_client_error)?;

    Ok(Json(summary))
}

/// Redeem one available mimo
///
/// POST /api/v1/clients/{client_id}/loyalty/redeem
pub async fn redeem_mimo(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<LoyaltySummaryDto>, AppError> {
    let summary = build_service(&state)
        .redeem_mimo(client_id)
        .await
        .map_err(map_client_error)?;

    Ok(Json(summary))
}
