use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/news", get(handlers::all_news))
        .route("/api/news/search", get(handlers::search_news))
        .route("/api/news/:category", get(handlers::category_news))
        .route("/api/health", get(handlers::health))
        .route("/api/stats", get(handlers::stats));

    let router = match &state.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(handlers::not_found),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use na_core::{Article, Error, Result};
}
