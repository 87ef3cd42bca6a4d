//! `/metrics` endpoint.

use std::sync::Arc;

use a2s_metrics::MetricStore;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::error;

/// Content type of the `/metrics` response.
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Shared state for the exporter handlers.
#[derive(Clone)]
pub struct ExporterState {
    pub store: Arc<MetricStore>,
}

/// Build the exporter router.
pub fn build_router(store: Arc<MetricStore>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .with_state(ExporterState { store })
}

/// GET /metrics
pub async fn metrics(State(state): State<ExporterState>) -> Response {
    match state.store.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
