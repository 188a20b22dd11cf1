//! Showroom back-office.
//!
//! A REST backend for a car dealership site plus the client-side toolkit its
//! panels are built from: the list-view pipeline, a data-access interface,
//! a generic panel controller and the booking wizard.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod format;
pub mod listview;
pub mod panel;
pub mod resources;
pub mod uploads;
pub mod wizard;

use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use resources::ResourceRegistry;
use uploads::{UploadStore, UPLOADS_ROUTE};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub resources: Arc<ResourceRegistry>,
    pub uploads: Arc<UploadStore>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        .route("/resources", get(api::list_resources))
        .route("/{resource}", get(api::list_records).post(api::create_record))
        .route("/{resource}/view", get(api::view_records))
        .route(
            "/{resource}/{id}",
            get(api::get_record)
                .put(api::update_record)
                .delete(api::delete_record),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.uploads.root()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
