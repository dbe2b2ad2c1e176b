use crate::infra::{
    ApiGateway, AppState, InMemoryApplicationRepository, InMemoryJobRepository,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use careerbridge::directory::directory_router;
use careerbridge::ledger::{ledger_router, ApplicationLedgerService, LedgerRouterState};
use careerbridge::registry::{registry_router, JobRegistryService, RegistryRouterState};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn app_router(
    gate: Arc<ApiGateway>,
    registry: Arc<JobRegistryService<InMemoryJobRepository>>,
    ledger: Arc<ApplicationLedgerService<InMemoryApplicationRepository, InMemoryJobRepository>>,
) -> axum::Router {
    directory_router(gate.clone())
        .merge(registry_router(RegistryRouterState {
            registry,
            gate: gate.clone(),
        }))
        .merge(ledger_router(LedgerRouterState { ledger, gate }))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
