//! Request body validation
//!
//! [`RequestValidator`] is a [`CrudMiddleware`](crate::core::middleware::CrudMiddleware)
//! that checks the bodies of `create`, `bulkCreate`, `update` and
//! `bulkUpdate` against shapes declared with the `validator` derive macros,
//! answering 400 with a list of [`ValidationIssue`]s before the core handler
//! ever runs.

pub mod issue;
pub mod validator;

pub use issue::ValidationIssue;
pub use validator::{RequestValidator, validate_payload, validate_payloads};
