pub mod auth;
mod error;
mod validation;

pub use error::{ApiError, ErrorCode, ErrorResponse};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
        .route("/request-code", post(auth::request_code))
        .route("/verify-code", post(auth::verify_code))
        .route("/reset-password", post(auth::reset_password));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
