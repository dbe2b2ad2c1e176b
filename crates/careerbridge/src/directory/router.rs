use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{AuthError, AuthGateway, IdentityProvider};
use crate::policy::Action;
use crate::store::StoreError;

use super::domain::{NewUserProfile, Role, UserRecord};
use super::repository::UserRepository;
use super::service::DirectoryError;

/// The directory routes only need the gateway: it carries both the
/// identity provider and the directory service.
pub type DirectoryRouterState<P, U> = Arc<AuthGateway<P, U>>;

/// Router builder exposing authentication and user-management endpoints.
pub fn directory_router<P, U>(state: DirectoryRouterState<P, U>) -> Router
where
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route("/api/v1/auth/register", post(register_handler::<P, U>))
        .route("/api/v1/auth/login", post(login_handler::<P, U>))
        .route("/api/v1/users", get(list_users_handler::<P, U>))
        .route(
            "/api/v1/users/employers",
            post(create_employer_handler::<P, U>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) role: Role,
    #[serde(default)]
    pub(crate) company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateEmployerRequest {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) company: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub(crate) token: String,
    pub(crate) user: UserRecord,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    pub(crate) token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user: Option<UserRecord>,
}

pub(crate) async fn register_handler<P, U>(
    State(gate): State<DirectoryRouterState<P, U>>,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Response
where
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    // Self-signup covers the two public roles; administrator accounts are
    // provisioned out of band.
    if request.role == Role::Admin {
        let payload = json!({ "error": "role must be student or employer" });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    let session = match gate
        .provider()
        .register(&request.email, &request.password, &request.name)
    {
        Ok(session) => session,
        Err(err) => return auth_error_response(err),
    };

    let profile = NewUserProfile {
        email: request.email,
        name: request.name,
        phone: request.phone,
        role: request.role,
        company: request.company,
    };

    match gate
        .directory()
        .create_user(&session.identity.user_id, profile)
    {
        Ok(user) => {
            let body = SessionResponse {
                token: session.token,
                user,
            };
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(err) => directory_error_response(err),
    }
}

pub(crate) async fn login_handler<P, U>(
    State(gate): State<DirectoryRouterState<P, U>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let session = match gate
        .provider()
        .authenticate(&request.email, &request.password)
    {
        Ok(session) => session,
        Err(err) => return auth_error_response(err),
    };

    match gate.directory().find(&session.identity.user_id) {
        Ok(user) => {
            let body = LoginResponse {
                token: session.token,
                user,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => directory_error_response(DirectoryError::Store(err)),
    }
}

pub(crate) async fn list_users_handler<P, U>(
    State(gate): State<DirectoryRouterState<P, U>>,
    headers: HeaderMap,
) -> Response
where
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match gate.authorize(&headers, Action::ListUsers) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };
    match gate.directory().list_users(&caller) {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(err) => directory_error_response(err),
    }
}

pub(crate) async fn create_employer_handler<P, U>(
    State(gate): State<DirectoryRouterState<P, U>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateEmployerRequest>,
) -> Response
where
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    let caller = match gate.authorize(&headers, Action::CreateEmployerAccount) {
        Ok(caller) => caller,
        Err(refusal) => return refusal.into_response(),
    };

    let session = match gate
        .provider()
        .register(&request.email, &request.password, &request.name)
    {
        Ok(session) => session,
        Err(err) => return auth_error_response(err),
    };

    let profile = NewUserProfile {
        email: request.email,
        name: request.name,
        phone: request.phone,
        role: Role::Employer,
        company: Some(request.company),
    };

    match gate
        .directory()
        .create_employer(&caller, &session.identity.user_id, profile)
    {
        Ok(user) => (StatusCode::CREATED, axum::Json(user)).into_response(),
        Err(err) => directory_error_response(err),
    }
}

fn auth_error_response(err: AuthError) -> Response {
    match err {
        AuthError::EmailTaken => {
            let payload = json!({ "error": "email already registered" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        AuthError::InvalidCredentials => {
            let payload = json!({ "error": "invalid email or password" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
        AuthError::Store(StoreError::Timeout) => {
            let payload = json!({ "error": "store request timed out" });
            (StatusCode::GATEWAY_TIMEOUT, axum::Json(payload)).into_response()
        }
        AuthError::Store(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn directory_error_response(err: DirectoryError) -> Response {
    match err {
        DirectoryError::Forbidden => Redirect::to("/").into_response(),
        DirectoryError::MissingField(field) => {
            let payload = json!({ "error": format!("missing required field: {field}") });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        DirectoryError::NotFound => {
            let payload = json!({ "error": "user not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        DirectoryError::Conflict => {
            let payload = json!({ "error": "user already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        DirectoryError::Store(StoreError::Timeout) => {
            let payload = json!({ "error": "store request timed out" });
            (StatusCode::GATEWAY_TIMEOUT, axum::Json(payload)).into_response()
        }
        DirectoryError::Store(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
