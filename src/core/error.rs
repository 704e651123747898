//! Typed errors for the CRUD layer, authorization and configuration
//!
//! # Error Categories
//!
//! - [`CrudError`]: failures of a CRUD operation, rendered as
//!   `{"message": ...}` JSON bodies (validation failures render as the list
//!   of issues)
//! - [`AuthError`]: authorization failures, rendered as `{"error": ...}`
//!   (403 has no body)
//! - [`ConfigError`]: configuration loading failures (never rendered)
//!
//! Every HTTP-facing error converts into an axum response, so handlers can
//! return `Result<_, CrudError>` and never leak an unhandled fault.

use crate::core::validation::ValidationIssue;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

// =============================================================================
// CRUD errors
// =============================================================================

/// Errors produced while handling a CRUD operation
#[derive(Debug, Error)]
pub enum CrudError {
    /// No entity with the requested identifier
    #[error("Entity not found")]
    NotFound,

    /// The request body is not JSON of the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The request body exceeds the configured size limit
    #[error("Payload too large")]
    PayloadTooLarge,

    /// The request body failed validation
    #[error("Validation failed with {} issue(s)", .0.len())]
    ValidationFailed(Vec<ValidationIssue>),

    /// Repository or serialization fault
    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl CrudError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrudError::NotFound => StatusCode::NOT_FOUND,
            CrudError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            CrudError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            CrudError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            CrudError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CrudError::NotFound => "ENTITY_NOT_FOUND",
            CrudError::InvalidBody(_) => "INVALID_BODY",
            CrudError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            CrudError::ValidationFailed(_) => "VALIDATION_FAILED",
            CrudError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Map a body extraction rejection, keeping 413 for oversized bodies
    pub fn from_body_rejection(status: StatusCode, text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            CrudError::PayloadTooLarge
        } else {
            CrudError::InvalidBody(text)
        }
    }
}

impl From<anyhow::Error> for CrudError {
    fn from(err: anyhow::Error) -> Self {
        CrudError::Internal(err)
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            CrudError::NotFound => {
                (status, Json(json!({ "message": "Entity not found" }))).into_response()
            }
            CrudError::InvalidBody(error) => (
                status,
                Json(json!({ "message": "Invalid request body", "error": error })),
            )
                .into_response(),
            CrudError::PayloadTooLarge => {
                (status, Json(json!({ "message": "Payload too large" }))).into_response()
            }
            CrudError::ValidationFailed(issues) => (status, Json(issues)).into_response(),
            CrudError::Internal(error) => (
                status,
                Json(json!({
                    "message": "Internal server error",
                    "error": format!("{:#}", error)
                })),
            )
                .into_response(),
        }
    }
}

// =============================================================================
// Authorization errors
// =============================================================================

/// Errors produced by the identity provider client and the `authorize` middleware
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is missing")]
    MissingHeader,

    #[error("Token is missing")]
    MissingToken,

    /// The identity provider rejected the token (signature, key id, expiry, issuer)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Discovery or key download failed; the client stays uninitialized
    #[error("Identity provider discovery failed: {0}")]
    Discovery(String),

    /// The token endpoint answered with a non-success status
    #[error("Token request failed with status {status}: {body}")]
    TokenRequest { status: u16, body: String },

    /// Transport failure talking to the identity provider
    #[error("Identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A handler asked for the verified identity but `authorize` never ran
    #[error("No verified identity on the request; the route is not behind authorize")]
    IdentityUnavailable,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
            AuthError::Discovery(_)
            | AuthError::TokenRequest { .. }
            | AuthError::Http(_)
            | AuthError::IdentityUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "AUTH_HEADER_MISSING",
            AuthError::MissingToken => "TOKEN_MISSING",
            AuthError::InvalidToken(_) => "TOKEN_INVALID",
            AuthError::Discovery(_) => "IDP_DISCOVERY_FAILED",
            AuthError::TokenRequest { .. } => "IDP_TOKEN_REQUEST_FAILED",
            AuthError::Http(_) => "IDP_UNREACHABLE",
            AuthError::IdentityUnavailable => "IDENTITY_UNAVAILABLE",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // Rejected tokens get a bare 403
            AuthError::InvalidToken(_) => status.into_response(),
            AuthError::MissingHeader | AuthError::MissingToken => {
                (status, Json(json!({ "error": self.to_string() }))).into_response()
            }
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

// =============================================================================
// Configuration errors
// =============================================================================

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Environment variable {0} is not set or has no value")]
    MissingEnv(String),

    #[error("Environment variable {name} has an invalid value '{value}'")]
    InvalidEnv { name: String, value: String },
}
