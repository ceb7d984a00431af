//! CORS Middleware Configuration
//!
//! The reception front-end runs on a separate origin, so the API has
//! to answer preflight requests for every origin in the configuration.

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;

/// Build the CORS layer from configuration.
///
/// Origins that fail to parse are dropped. With no usable origin left
/// the layer allows any origin, which keeps local development working
/// without a config file.
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(settings.max_age_seconds))
}
