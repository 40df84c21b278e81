use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod account;
pub mod content;
pub mod favorites;
pub mod recommendations;
pub mod session;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/session",
            get(session::current).post(session::login).delete(session::logout),
        )
        .route("/signup", post(session::signup))
        .route(
            "/profile",
            get(account::profile)
                .post(account::update_profile)
                .put(account::update_account),
        )
        .route("/library", get(account::library))
        .route("/favorites", get(favorites::list))
        .route("/favorites/:content_id/toggle", post(favorites::toggle))
        .route("/for-you", get(recommendations::for_you))
        .route("/recommendations", get(recommendations::by_title))
        .route("/content", get(content::browse))
        .route("/suggestions", get(content::suggestions))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
