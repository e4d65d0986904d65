use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        // Top to bottom, outermost first: the trace span needs the request id
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_span_with_request_id)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/availability/batch", post(handlers::batch_availability))
        .route("/availability/:id", get(handlers::get_availability))
        .route("/search", get(handlers::search))
        .route("/services", get(handlers::list_services))
}
