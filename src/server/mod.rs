mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::coverage::CoverageStore;
use crate::location::LocationResolver;

pub fn build_router(resolver: LocationResolver, store: Option<Box<dyn CoverageStore>>) -> Router {
    let state = Arc::new(AppState { resolver, store });

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/reverse", get(handlers::reverse))
        .route("/api/coverage", get(handlers::coverage))
        .route("/api/coverage/{id}/providers", get(handlers::providers))
        .route("/api/gazetteer", get(handlers::gazetteer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(
    host: &str,
    port: u16,
    resolver: LocationResolver,
    store: Option<Box<dyn CoverageStore>>,
) -> std::io::Result<()> {
    if store.is_none() {
        warn!("no coverage source configured; /api/coverage and /api/coverage/{{id}}/providers will answer 503");
    }
    let app = build_router(resolver, store);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("coverage API listening on http://{}", addr);
    axum::serve(listener, app).await
}
