//! Product Handlers
//!
//! HTTP handlers for the retail inventory.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::UpsertProductRequest;
use crate::application::services::{
    ProductError, ProductService, ProductServiceImpl, UpsertProductDto,
};
use crate::domain::entities::Product;
use crate::infrastructure::repositories::PgProductRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Helper to convert ProductError to AppError
fn map_product_error(e: ProductError) -> AppError {
    match e {
        ProductError::NotFound => AppError::NotFound("Product not found".into()),
        ProductError::Validation(msg) => AppError::BadRequest(msg),
        ProductError::Internal(msg) => AppError::Internal(msg),
    }
}

fn build_service(state: &AppState) -> ProductServiceImpl<PgProductRepository> {
    ProductServiceImpl::new(Arc::new(PgProductRepository::new(state.db.clone())))
}

fn to_dto(body: UpsertProductRequest) -> UpsertProductDto {
    UpsertProductDto {
        name: body.name,
        stock: body.stock,
        low_stock_threshold: body.low_stock_threshold,
        cost_price: body.cost_price,
        selling_price: body.selling_price,
        last_restock_date: body.last_restock_date,
    }
}

/// Add a product
///
/// POST /api/v1/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<UpsertProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    body.validate().map_err(validation_error)?;

    let product = build_service(&state)
        .create(to_dto(body))
        .await
        .map_err(map_product_error)?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// List products
///
/// GET /api/v1/products
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = build_service(&state)
        .list()
        .await
        .map_err(map_product_error)?;

    Ok(Json(products))
}

/// Update a product
///
/// PUT /api/v1/products/{product_id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<UpsertProductRequest>,
) -> Result<Json<Product>, AppError> {
    body.validate().map_err(validation_error)?;

    let product = build_service(&state)
        .update(product_id, to_dto(body))
        .await
        .map_err(map_product_error)?;

    Ok(Json(product))
}

/// Remove a product
///
/// DELETE /api/v1/products/{product_id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    build_service(&state)
        .delete(product_id)
        .await
        .map_err(map_product_error)?;

    Ok(StatusCode::NO_CONTENT)
}
