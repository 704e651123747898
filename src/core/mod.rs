//! Core module containing the fundamental traits and types of the framework

pub mod auth;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod operation;
pub mod query;
pub mod repository;
pub mod validation;

pub use auth::{Identity, IdentityProvider, TokenSet, authorize};
pub use entity::Entity;
pub use error::{AuthError, ConfigError, CrudError};
pub use middleware::CrudMiddleware;
pub use operation::Operation;
pub use query::{CountResponse, PaginatedResponse, Pagination, PaginationQuery, SearchCriteria};
pub use repository::Repository;
pub use validation::{RequestValidator, ValidationIssue};
