//! Catalog Handlers
//!
//! HTTP handlers for the service and package catalog, including
//! package sales.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{SellPackageRequest, UpsertPackageRequest, UpsertServiceRequest};
use crate::application::services::{
    CatalogError, CatalogService, CatalogServiceImpl, UpsertPackageDto, UpsertServiceDto,
};
use crate::domain::entities::{Package, PackageItem, PackageInstance, SalonService};
use crate::infrastructure::repositories::{
    PgClientRepository, PgPackageRepository, PgServiceRepository,
};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Helper to convert CatalogError to AppError
fn map_catalog_error(e: CatalogError) -> AppError {
    match e {
        CatalogError::ServiceNotFound => AppError::NotFound("Service not found".into()),
        CatalogError::PackageNotFound => AppError::NotFound("Package not found".into()),
        CatalogError::ClientNotFound => AppError::NotFound("Client not found".into()),
        CatalogError::NotSellable => AppError::BadRequest("Package is not sellable".into()),
        CatalogError::Validation(msg) => AppError::BadRequest(msg),
        CatalogError::Internal(msg) => AppError::Internal(msg),
    }
}

fn build_service(
    state: &AppState,
) -> CatalogServiceImpl<PgServiceRepository, PgPackageRepository, PgClientRepository> {
    CatalogServiceImpl::new(
        Arc::new(PgServiceRepository::new(state.db.clone())),
        Arc::new(PgPackageRepository::new(state.db.clone())),
        Arc::new(PgClientRepository::new(state.db.clone())),
    )
}

fn to_service_dto(body: UpsertServiceRequest) -> UpsertServiceDto {
    UpsertServiceDto {
        name: body.name,
        price: body.price,
        duration_minutes: body.duration_minutes,
        category: body.category,
    }
}

fn to_package_dto(body: UpsertPackageRequest) -> UpsertPackageDto {
    UpsertPackageDto {
        name: body.name,
        short_description: body.short_description,
        price: body.price,
        original_price: body.original_price,
        validity_days: body.validity_days,
        status: body.status,
        items: body
            .items
            .into_iter()
            .map(|item| PackageItem {
                service_id: item.service_id,
                quantity: item.quantity,
            })
            .collect(),
    }
}

/// Add a service to the catalog
///
/// POST /api/v1/services
pub async fn create_service(
    State(state): State<AppState>,
    Json(body): Json<UpsertServiceRequest>,
) -> Result<(StatusCode, Json<SalonService>), AppError> {
    body.validate().map_err(validation_error)?;

    let service = build_service(&state)
        .create_service(to_service_dto(body))
        .await
        .map_err(map_catalog_error)?;

    Ok((StatusCode::CREATED, Json(service)))
}

/// List catalog services
///
/// GET /api/v1/services
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<SalonService>>, AppError> {
    let services = build_service(&state)
        .list_services()
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(services))
}

/// Update a catalog service
///
/// PUT /api/v1/services/{service_id}
pub async fn update_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Json(body): Json<UpsertServiceRequest>,
) -> Result<Json<SalonService>, AppError> {
    body.validate().map_err(validation_error)?;

    let service = build_service(&state)
        .update_service(service_id, to_service_dto(body))
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(service))
}

/// Remove a catalog service
///
/// DELETE /api/v1/services/{service_id}
pub async fn delete_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    build_service(&state)
        .delete_service(service_id)
        .await
        .map_err(map_catalog_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a package to the catalog
///
/// POST /api/v1/packages
pub async fn create_package(
    State(state): State<AppState>,
    Json(body): Json<UpsertPackageRequest>,
) -> Result<(StatusCode, Json<Package>), AppError> {
    body.validate().map_err(validation_error)?;

    let package = build_service(&state)
        .create_package(to_package_dto(body))
        .await
        .map_err(map_catalog_error)?;

    Ok((StatusCode::CREATED, Json(package)))
}

/// List catalog packages
///
/// GET /api/v1/packages
pub async fn list_packages(State(state): State<AppState>) -> Result<Json<Vec<Package>>, AppError> {
    let packages = build_service(&state)
        .list_packages()
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(packages))
}

/// Update a catalog package
///
/// PUT /api/v1/packages/{package_id}
pub async fn update_package(
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
    Json(body): Json<UpsertPackageRequest>,
) -> Result<Json<Package>, AppError> {
    body.validate().map_err(validation_error)?;

    let package = build_service(&state)
        .update_package(package_id, to_package_dto(body))
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(package))
}

/// Remove a catalog package
///
/// DELETE /api/v1/packages/{package_id}
pub async fn delete_package(
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    build_service(&state)
        .delete_package(package_id)
        .await
        .map_err(map_catalog_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Sell a package to a client
///
/// POST /api/v1/packages/{package_id}/sell
///
/// Creates an independent package instance on the client with full
/// per-service counters and an expiry derived from the validity window.
pub async fn sell_package(
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
    Json(body): Json<SellPackageRequest>,
) -> Result<(StatusCode, Json<PackageInstance>), AppError> {
    let instance = build_service(&state)
        .sell_package(package_id, body.client_id)
        .await
        .map_err(map_catalog_error)?;

    Ok((StatusCode::CREATED, Json(instance)))
}
