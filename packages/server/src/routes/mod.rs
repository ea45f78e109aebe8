use axum::{Router, routing::get};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home::home))
        .merge(auth_routes())
        .merge(file_routes(config))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(handlers::auth::register_form).post(handlers::auth::register),
        )
        .route(
            "/login",
            get(handlers::auth::login_form).post(handlers::auth::login),
        )
        .route("/logout", get(handlers::auth::logout))
}

fn file_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::files::dashboard))
        .route(
            "/upload",
            get(handlers::files::upload_form)
                .post(handlers::files::upload)
                .layer(handlers::files::upload_body_limit(
                    config.storage.max_upload_size,
                )),
        )
        .route(
            "/extract_text",
            get(handlers::files::extract_text).post(handlers::files::extract_text),
        )
}
