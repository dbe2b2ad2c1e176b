use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{AuthGateway, IdentityProvider};
use crate::directory::UserRepository;
use crate::policy::Action;
use crate::store::StoreError;

use super::domain::{JobDecision, JobId, JobSubmission};
use super::repository::JobRepository;
use super::service::{JobRegistryService, RegistryError};

/// Shared state for the job routes: the registry plus the auth gate.
pub struct RegistryRouterState<J, P, U> {
    pub registry: Arc<JobRegistryService<J>>,
    pub gate: Arc<AuthGateway<P, U>>,
}

impl<J, P, U> Clone for RegistryRouterState<J, P, U> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            gate: self.gate.clone(),
        }
    }
}

/// Router builder exposing the job registry endpoints.
pub fn registry_router<J, P, U>(state: RegistryRouterState<J, P, U>) -> Router
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_jobs_handler::<J, P, U>).post(submit_job_handler::<J, P, U>),
        )
        .route("/api/v1/jobs/pending", get(pending_jobs_handler::<J, P, U>))
        .route("/api/v1/jobs/mine", get(own_postings_handler::<J, P, U>))
        .route(
            "/api/v1/jobs/:job_id",
            get(get_job_handler::<J, P, U>).delete(delete_job_handler::<J, P, U>),
        )
        .route(
            "/api/v1/jobs/:job_id/status",
            post(decide_job_handler::<J, P, U>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecideJobRequest {
    pub(crate) status: JobDecision,
}

pub(crate) async fn list_jobs_handler<J, P, U>(
    State(state): State<RegistryRouterState<J, P, U>>,
) -> Response
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    match state.registry.list_approved() {
        Ok(jobs) => (StatusCode::OK, axum::Json(jobs)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_job_handler<J, P, U>(
    State(state): State<RegistryRouterState<J, P, U>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<JobSubmission>,
) -> Response
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::SubmitJob) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state.registry.submit_job(&caller, submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn pending_jobs_handler<J, P, U>(
    State(state): State<RegistryRouterState<J, P, U>>,
    headers: HeaderMap,
) -> Response
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ReviewJobs) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state.registry.list_pending(&caller) {
        Ok(jobs) => (StatusCode::OK, axum::Json(jobs)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn own_postings_handler<J, P, U>(
    State(state): State<RegistryRouterState<J, P, U>>,
    headers: HeaderMap,
) -> Response
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ManageOwnPostings) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state.registry.list_own_postings(&caller) {
        Ok(jobs) => (StatusCode::OK, axum::Json(jobs)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_job_handler<J, P, U>(
    State(state): State<RegistryRouterState<J, P, U>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    // Public route; credentials only widen what is visible.
    let caller = match state.gate.caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response();
        }
    };
    match state.registry.get_job(caller.as_ref(), &JobId(job_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn decide_job_handler<J, P, U>(
    State(state): State<RegistryRouterState<J, P, U>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<DecideJobRequest>,
) -> Response
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ReviewJobs) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state
        .registry
        .set_status(&caller, &JobId(job_id), request.status)
    {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_job_handler<J, P, U>(
    State(state): State<RegistryRouterState<J, P, U>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::DeleteJob) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state.registry.delete_job(&caller, &JobId(job_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: RegistryError) -> Response {
    match err {
        // Ownership denials soft-deny exactly like role denials.
        RegistryError::Forbidden => Redirect::to("/").into_response(),
        RegistryError::MissingField(field) => {
            let payload = json!({ "error": format!("missing required field: {field}") });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        RegistryError::NotFound => {
            let payload = json!({ "error": "job not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        RegistryError::Conflict => {
            let payload = json!({ "error": "job already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        RegistryError::Store(StoreError::Timeout) => {
            let payload = json!({ "error": "store request timed out" });
            (StatusCode::GATEWAY_TIMEOUT, axum::Json(payload)).into_response()
        }
        RegistryError::Store(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
