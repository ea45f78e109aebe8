pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod routes;
pub mod state;
pub mod utils;
pub mod views;

use axum::middleware;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    routes::routes(&state.config)
        .layer(middleware::from_fn(flash::merge_deferred))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
