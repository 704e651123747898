//! Bearer token authorization
//!
//! The [`authorize`] middleware guards any route, independently of the CRUD
//! middleware chain:
//!
//! - no `Authorization` header: 401 `{"error": "Authorization header is missing"}`
//! - header without a token after the scheme: 401 `{"error": "Token is missing"}`
//! - token rejected by the [`IdentityProvider`]: 403 with an empty body
//! - token accepted: the [`Identity`] is stored in the request extensions
//!
//! ```rust,ignore
//! let provider: Arc<dyn IdentityProvider> = Arc::new(OpenIdClient::new(config)?);
//! let app = CrudController::new(repository, vec![])
//!     .routes()
//!     .layer(axum::middleware::from_fn_with_state(provider, authorize));
//! ```

use crate::core::error::AuthError;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Verified caller, built from the claims of an accepted token
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// `sub` claim
    pub subject: Option<String>,

    /// Every claim of the token as issued
    pub claims: Value,
}

impl Identity {
    pub fn from_claims(claims: Value) -> Self {
        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { subject, claims }
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn username(&self) -> Option<&str> {
        self.claim("preferred_username").and_then(Value::as_str)
    }

    /// Realm roles (`realm_access.roles`)
    pub fn roles(&self) -> Vec<&str> {
        self.claims
            .pointer("/realm_access/roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().contains(&role)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::IdentityUnavailable)
    }
}

/// Token endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub id_token: Option<String>,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub refresh_expires_in: Option<u64>,

    #[serde(default)]
    pub scope: Option<String>,
}

/// Client of an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Discover the provider endpoints and download the signing keys.
    ///
    /// Calling it again after a success is a no-op.
    async fn init(&self) -> Result<(), AuthError>;

    /// Verify a bearer token, initializing the client first if needed
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;

    /// Resource owner password grant
    async fn get_token(&self, username: &str, password: &str) -> Result<TokenSet, AuthError>;

    /// Refresh token grant
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, AuthError>;
}

/// Extract the token part of an `Authorization` header value
fn bearer_token(request: &Request) -> Result<&str, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.split(' ').nth(1))
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Axum middleware verifying the bearer token of every request
pub async fn authorize(
    State(provider): State<Arc<dyn IdentityProvider>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Ok(token) => token.to_string(),
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), "Unauthorized request: {}", e);
            return e.into_response();
        }
    };

    match provider.verify(&token).await {
        Ok(identity) => {
            tracing::debug!(subject = ?identity.subject, "Token accepted");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            match &e {
                AuthError::InvalidToken(_) => tracing::warn!("Token rejected: {}", e),
                _ => tracing::error!("Token verification failed: {}", e),
            }
            e.into_response()
        }
    }
}
