use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::service::ModelCatalogService;

pub mod handlers;

/// Shared application state passed to handlers.
pub struct AppState {
    pub service: ModelCatalogService,
}

/// Build the model API router.
/// All routes are relative; the caller mounts this under `/api/v1`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/models/resolve", post(handlers::resolve_models))
        .route("/models/sanitize", post(handlers::sanitize_model))
        .route("/models/invalidate", post(handlers::invalidate_cache))
        .route("/catalog/status", get(handlers::catalog_status))
        .route("/providers", get(handlers::list_providers))
        .fallback(fallback_404)
}

/// The full HTTP application: health check, `/api/v1`, tracing and
/// response-header middleware.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api/v1", api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response.
async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    // Model lists are per-credential; keep them out of shared caches.
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    headers.remove("Server");

    resp
}
