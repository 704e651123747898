//! Request body validator plugged into the CRUD middleware chain

use super::issue::ValidationIssue;
use crate::core::error::CrudError;
use crate::core::middleware::CrudMiddleware;
use crate::core::operation::Operation;
use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use validator::Validate;

/// Check a single payload against shape `S`.
///
/// Returns every issue found; an empty list means the payload is valid.
pub fn validate_payload<S>(payload: &Value) -> Vec<ValidationIssue>
where
    S: DeserializeOwned + Validate,
{
    match <S as serde::Deserialize>::deserialize(payload) {
        Ok(shape) => match shape.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => ValidationIssue::from_validation_errors(payload, &errors),
        },
        Err(error) => vec![ValidationIssue::from_shape_error(payload, &error)],
    }
}

/// Check every element of an array payload against shape `S`.
///
/// Issues of all elements are concatenated, each tagged with its element index.
pub fn validate_payloads<S>(payload: &Value) -> Result<Vec<ValidationIssue>, CrudError>
where
    S: DeserializeOwned + Validate,
{
    let items = payload
        .as_array()
        .ok_or_else(|| CrudError::InvalidBody("expected a JSON array".to_string()))?;

    Ok(items
        .iter()
        .enumerate()
        .flat_map(|(index, item)| {
            validate_payload::<S>(item)
                .into_iter()
                .map(move |issue| issue.at_index(Some(index)))
        })
        .collect())
}

/// Validating middleware provider
///
/// `C` is the shape checked for `create` and `bulkCreate`, `U` the shape for
/// `update` and `bulkUpdate` (defaults to `C`). Both are plain structs
/// deriving `serde::Deserialize` and `validator::Validate`; a payload fails
/// when it does not deserialize into the shape or when a rule fails.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Deserialize, Validate)]
/// struct NewCompany {
///     #[validate(length(min = 1))]
///     name: String,
/// }
///
/// let controller = CrudController::builder(repository)
///     .with_middleware(RequestValidator::<NewCompany>::new())
///     .build();
/// ```
///
/// The body is buffered under the limit of the surrounding controller
/// (`CrudConfig::max_body_bytes`); larger bodies are answered with 413.
pub struct RequestValidator<C, U = C> {
    _shapes: PhantomData<fn() -> (C, U)>,
}

impl<C, U> RequestValidator<C, U>
where
    C: DeserializeOwned + Validate + 'static,
    U: DeserializeOwned + Validate + 'static,
{
    pub fn new() -> Self {
        Self {
            _shapes: PhantomData,
        }
    }

    /// Read the body, run `check`, then either forward the untouched body or answer 400
    async fn guard<F>(&self, operation: Operation, request: Request, next: Next, check: F) -> Response
    where
        F: FnOnce(&Value) -> Result<Vec<ValidationIssue>, CrudError>,
    {
        let (parts, body) = request.into_parts();
        let buffered = Request::from_parts(parts.clone(), body);

        let bytes = match Bytes::from_request(buffered, &()).await {
            Ok(bytes) => bytes,
            Err(rejection) => {
                return CrudError::from_body_rejection(rejection.status(), rejection.body_text())
                    .into_response();
            }
        };

        let payload: Value = match serde_json::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(e) => return CrudError::InvalidBody(e.to_string()).into_response(),
        };

        match check(&payload) {
            Ok(issues) if issues.is_empty() => {
                next.run(Request::from_parts(parts, Body::from(bytes))).await
            }
            Ok(issues) => {
                tracing::debug!(
                    operation = %operation,
                    issues = issues.len(),
                    "Request body rejected by validator"
                );
                CrudError::ValidationFailed(issues).into_response()
            }
            Err(e) => e.into_response(),
        }
    }
}

impl<C, U> Default for RequestValidator<C, U>
where
    C: DeserializeOwned + Validate + 'static,
    U: DeserializeOwned + Validate + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C, U> CrudMiddleware for RequestValidator<C, U>
where
    C: DeserializeOwned + Validate + 'static,
    U: DeserializeOwned + Validate + 'static,
{
    fn intercepts(&self, operation: Operation) -> bool {
        operation.has_body()
    }

    async fn create(&self, request: Request, next: Next) -> Response {
        self.guard(Operation::Create, request, next, |payload| {
            Ok(validate_payload::<C>(payload))
        })
        .await
    }

    async fn bulk_create(&self, request: Request, next: Next) -> Response {
        self.guard(Operation::BulkCreate, request, next, validate_payloads::<C>)
            .await
    }

    async fn update(&self, request: Request, next: Next) -> Response {
        self.guard(Operation::Update, request, next, |payload| {
            Ok(validate_payload::<U>(payload))
        })
        .await
    }

    async fn bulk_update(&self, request: Request, next: Next) -> Response {
        self.guard(Operation::BulkUpdate, request, next, validate_payloads::<U>)
            .await
    }
}
