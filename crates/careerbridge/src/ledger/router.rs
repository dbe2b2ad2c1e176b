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
use crate::registry::{JobId, JobRepository};
use crate::store::StoreError;

use super::domain::{ApplicationDecision, ApplicationForm, ApplicationId};
use super::repository::ApplicationRepository;
use super::service::{ApplicationLedgerService, LedgerError};

/// Shared state for the application routes.
pub struct LedgerRouterState<A, J, P, U> {
    pub ledger: Arc<ApplicationLedgerService<A, J>>,
    pub gate: Arc<AuthGateway<P, U>>,
}

impl<A, J, P, U> Clone for LedgerRouterState<A, J, P, U> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            gate: self.gate.clone(),
        }
    }
}

/// Router builder exposing the application ledger endpoints.
pub fn ledger_router<A, J, P, U>(state: LedgerRouterState<A, J, P, U>) -> Router
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(job_applications_handler::<A, J, P, U>)
                .post(submit_application_handler::<A, J, P, U>),
        )
        .route(
            "/api/v1/applications/mine",
            get(own_applications_handler::<A, J, P, U>),
        )
        .route(
            "/api/v1/applications/received",
            get(received_applications_handler::<A, J, P, U>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(decide_application_handler::<A, J, P, U>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecideApplicationRequest {
    pub(crate) status: ApplicationDecision,
}

pub(crate) async fn submit_application_handler<A, J, P, U>(
    State(state): State<LedgerRouterState<A, J, P, U>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    axum::Json(form): axum::Json<ApplicationForm>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ApplyToJob) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state
        .ledger
        .submit_application(&caller, &JobId(job_id), form)
    {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn own_applications_handler<A, J, P, U>(
    State(state): State<LedgerRouterState<A, J, P, U>>,
    headers: HeaderMap,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ViewOwnApplications) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state.ledger.list_own_applications(&caller) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn received_applications_handler<A, J, P, U>(
    State(state): State<LedgerRouterState<A, J, P, U>>,
    headers: HeaderMap,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ReviewApplications) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state.ledger.list_received_applications(&caller) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn job_applications_handler<A, J, P, U>(
    State(state): State<LedgerRouterState<A, J, P, U>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ReviewApplications) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state
        .ledger
        .list_applications_for_job(&caller, &JobId(job_id))
    {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn decide_application_handler<A, J, P, U>(
    State(state): State<LedgerRouterState<A, J, P, U>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DecideApplicationRequest>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match state.gate.authorize(&headers, Action::ReviewApplications) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match state.ledger.decide_application(
        &caller,
        &ApplicationId(application_id),
        request.status,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: LedgerError) -> Response {
    match err {
        LedgerError::Forbidden => Redirect::to("/").into_response(),
        LedgerError::MissingField(field) => {
            let payload = json!({ "error": format!("missing required field: {field}") });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        LedgerError::JobNotFound => {
            let payload = json!({ "error": "job not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        LedgerError::NotFound => {
            let payload = json!({ "error": "application not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        LedgerError::Duplicate => {
            let payload = json!({ "error": "an application for this job already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        LedgerError::Store(StoreError::Timeout) => {
            let payload = json!({ "error": "store request timed out" });
            (StatusCode::GATEWAY_TIMEOUT, axum::Json(payload)).into_response()
        }
        LedgerError::Store(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
