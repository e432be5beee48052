pub mod handlers;
pub mod models;

use axum::{
    routing::{get, post},
    Router,
};
use common::settings::Settings;
use common::Services;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub settings: Settings,
    pub services: Services,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.settings.static_dir);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/activities", get(handlers::list_activities))
        .route(
            "/activities/:activity_name/signup",
            post(handlers::signup),
        )
        .route(
            "/activities/:activity_name/unregister",
            post(handlers::unregister),
        )
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
