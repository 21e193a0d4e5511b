pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeFile, set_header::SetResponseHeaderLayer};

use crate::analysis::handlers;
use crate::errors::panic_response;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload_bytes = state.config.max_upload_bytes;

    // Cache headers sit outside the body limit so rejections carry them too.
    let compare = post(handlers::handle_compare).layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::PRAGMA,
                HeaderValue::from_static("no-cache"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::EXPIRES,
                HeaderValue::from_static("0"),
            ))
            .layer(DefaultBodyLimit::max(max_upload_bytes)),
    );

    Router::new()
        // Static frontend
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/styles.css", ServeFile::new(static_dir.join("styles.css")))
        .route_service("/script.js", ServeFile::new(static_dir.join("script.js")))
        // API
        .route("/health", get(health::health_handler))
        .route("/compare", compare)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}
