//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::auth_middleware;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes (all require authentication)
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/appointments", appointment_routes())
        .nest("/clients", client_routes())
        .nest("/services", service_routes())
        .nest("/packages", package_routes())
        .nest("/professionals", professional_routes())
        .nest("/products", product_routes())
        .nest("/transactions", transaction_routes())
        .nest("/settings", settings_routes())
        .nest("/admin", admin_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Agenda routes
fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::appointment::list_appointments))
        .route("/", post(handlers::appointment::create_appointment))
        .route("/day-grid", get(handlers::appointment::day_grid))
        .route("/advisories", get(handlers::appointment::coverage_advisories))
        .route("/{appointment_id}", get(handlers::appointment::get_appointment))
        .route("/{appointment_id}", put(handlers::appointment::update_appointment))
        .route("/{appointment_id}", delete(handlers::appointment::delete_appointment))
        .route(
            "/{appointment_id}/status",
            patch(handlers::appointment::update_appointment_status),
        )
}

/// Client and loyalty routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::client::list_clients))
        .route("/", post(handlers::client::create_client))
        .route("/{client_id}", get(handlers::client::get_client))
        .route("/{client_id}", put(handlers::client::update_client))
        .route("/{client_id}", delete(handlers::client::delete_client))
        .route("/{client_id}/loyalty", get(handlers::client::loyalty_summary))
        .route("/{client_id}/loyalty/redeem", post(handlers::client::redeem_mimo))
}

/// Service catalog routes
fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::catalog::list_services))
        .route("/", post(handlers::catalog::create_service))
        .route("/{service_id}", put(handlers::catalog::update_service))
        .route("/{service_id}", delete(handlers::catalog::delete_service))
}

/// Package catalog and sales routes
fn package_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::catalog::list_packages))
        .route("/", post(handlers::catalog::create_package))
        .route("/{package_id}", put(handlers::catalog::update_package))
        .route("/{package_id}", delete(handlers::catalog::delete_package))
        .route("/{package_id}/sell", post(handlers::catalog::sell_package))
}

/// Professional roster routes
fn professional_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::professional::list_professionals))
        .route("/", post(handlers::professional::create_professional))
        .route("/{professional_id}", put(handlers::professional::update_professional))
        .route("/{professional_id}", delete(handlers::professional::delete_professional))
}

/// Retail inventory routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::product::list_products))
        .route("/", post(handlers::product::create_product))
        .route("/{product_id}", put(handlers::product::update_product))
        .route("/{product_id}", delete(handlers::product::delete_product))
}

/// Ledger routes
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::finance::list_transactions))
        .route("/", post(handlers::finance::append_transaction))
        .route("/summary", get(handlers::finance::transaction_summary))
}

/// Settings routes
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::settings::get_settings))
        .route("/", put(handlers::settings::update_settings))
}

/// Administrative clear-all routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", delete(handlers::finance::clear_transactions))
        .route("/appointments", delete(handlers::finance::clear_appointments))
}
