pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::resume::handlers;
use crate::state::AppState;

fn resume_parse_route() -> MethodRouter<AppState> {
    post(handlers::handle_resume_parse)
        .options(handlers::handle_preflight)
        .fallback(handlers::handle_method_not_allowed)
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/resume-parse", resume_parse_route())
        .route("/api/v1/resume-parse", resume_parse_route())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
