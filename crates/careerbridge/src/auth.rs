//! Identity handling at the HTTP boundary.
//!
//! The identity provider is an external system reached through the
//! [`IdentityProvider`] trait; the core only consumes the stable user id
//! and display attributes it returns. There is no ambient "current user":
//! every operation receives an explicit [`Caller`] resolved per request.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use crate::directory::{DirectoryService, Role, UserRepository};
use crate::policy::{self, AccessDecision, Action};
use crate::store::StoreError;

/// Stable identity issued by the external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

/// A provider identity together with its opaque session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

/// Identity resolved against the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

/// Contract with the external authentication service.
pub trait IdentityProvider: Send + Sync {
    /// Create provider credentials and return a signed-in session.
    fn register(&self, email: &str, password: &str, display_name: &str)
        -> Result<Session, AuthError>;
    fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    /// Resolve a bearer token back to its identity, if the session is live.
    fn verify(&self, token: &str) -> Result<Option<Identity>, AuthError>;
}

/// Error raised at the identity-provider boundary.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves request credentials into a role-carrying [`Caller`] and applies
/// the route-level access policy.
pub struct AuthGateway<P, U> {
    provider: Arc<P>,
    directory: Arc<DirectoryService<U>>,
}

impl<P, U> AuthGateway<P, U>
where
    P: IdentityProvider + 'static,
    U: UserRepository + 'static,
{
    pub fn new(provider: Arc<P>, directory: Arc<DirectoryService<U>>) -> Self {
        Self {
            provider,
            directory,
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn directory(&self) -> &Arc<DirectoryService<U>> {
        &self.directory
    }

    /// Resolve the caller for a request, if any credentials were presented.
    /// A token without a directory record resolves to no caller rather than
    /// an error, so half-created accounts behave like anonymous visitors.
    pub fn caller_from_headers(&self, headers: &HeaderMap) -> Result<Option<Caller>, GatewayError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };
        let Some(identity) = self.provider.verify(token)? else {
            return Ok(None);
        };
        self.caller_for(&identity)
    }

    pub fn caller_for(&self, identity: &Identity) -> Result<Option<Caller>, GatewayError> {
        let Some(user) = self.directory.find(&identity.user_id)? else {
            return Ok(None);
        };
        Ok(Some(Caller {
            user_id: user.uid,
            role: user.role,
        }))
    }

    /// Route-level gate for non-public actions. Denials become redirects:
    /// unauthenticated callers go to `/auth`, wrong-role callers to `/`.
    /// Neither response body distinguishes the two cases.
    pub fn authorize(&self, headers: &HeaderMap, action: Action) -> Result<Caller, GateRefusal> {
        let caller = self
            .caller_from_headers(headers)
            .map_err(GateRefusal::Failure)?;
        match (policy::check(caller.as_ref(), action), caller) {
            (AccessDecision::Granted, Some(caller)) => Ok(caller),
            (AccessDecision::WrongRole, _) => Err(GateRefusal::Redirect(Redirect::to("/"))),
            _ => Err(GateRefusal::Redirect(Redirect::to("/auth"))),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim)
}

/// Why a gated request was not handed to its service.
#[derive(Debug)]
pub enum GateRefusal {
    Redirect(Redirect),
    Failure(GatewayError),
}

impl IntoResponse for GateRefusal {
    fn into_response(self) -> Response {
        match self {
            GateRefusal::Redirect(redirect) => redirect.into_response(),
            GateRefusal::Failure(err) => {
                let payload = json!({ "error": err.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        }
    }
}

/// Error raised while resolving a caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
