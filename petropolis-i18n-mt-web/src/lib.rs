//! HTTP API for Petropolis machine translation
//!
//! - `POST /api/translate` translates editor content (`edit_html`)
//! - `POST /api/translate/layers/{layer}` bulk-translates a layer table (`edit_layers`)
//! - `GET /health`

pub mod auth;
pub mod config;
pub mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use petropolis_i18n_mt::{BulkTranslator, Translator};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use auth::{AuthError, Capability, PermissionChecker, TokenSpecError};
pub use config::Config;
pub use routes::ErrorResponse;

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn Translator>,
    pub bulk: BulkTranslator,
    pub permissions: Arc<PermissionChecker>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/translate", post(routes::translate))
        .route("/api/translate/layers/{layer}", post(routes::translate_layer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
