//! # crud-rs
//!
//! Generic CRUD scaffolding for axum APIs.
//!
//! ## Features
//!
//! - **Generic controller**: twelve standard routes (list, paginate, getById,
//!   create, bulkCreate, update, bulkUpdate, delete, softDelete, restore,
//!   search, count) for any entity, backed by a pluggable repository
//! - **Per-operation middleware**: ordered providers that can inspect,
//!   decorate or short-circuit each operation
//! - **Request validation**: body shapes declared with `validator` derives,
//!   answering 400 with structured issues
//! - **OpenID authorization**: bearer token verification against a Keycloak
//!   realm, with password and refresh grants
//! - **Soft delete**: built-in `isDeleted` marker with softDelete/restore
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crud::prelude::*;
//!
//! impl_crud_entity!(Company, "companies", {
//!     name: String,
//! });
//!
//! #[derive(Deserialize, Validate)]
//! struct NewCompany {
//!     #[validate(length(min = 1))]
//!     name: String,
//! }
//!
//! let companies = CrudController::builder(InMemoryRepository::<Company>::new())
//!     .with_middleware(RequestValidator::<NewCompany>::new())
//!     .build();
//!
//! ServerBuilder::new()
//!     .mount("/companies", &companies)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
#[macro_use]
pub mod entities;
pub mod identity;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        auth::{Identity, IdentityProvider, TokenSet, authorize},
        entity::Entity,
        error::{AuthError, ConfigError, CrudError},
        middleware::CrudMiddleware,
        operation::Operation,
        query::{CountResponse, PaginatedResponse, Pagination, PaginationQuery, SearchCriteria},
        repository::Repository,
        validation::{RequestValidator, ValidationIssue},
    };

    // === Macros ===
    pub use crate::impl_crud_entity;

    // === Identity ===
    pub use crate::identity::OpenIdClient;

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryRepository;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresRepository;

    // === Config ===
    pub use crate::config::{AppConfig, CrudConfig, OpenIdConfig, PaginationConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{CrudController, CrudControllerBuilder, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
    pub use validator::Validate;

    // === Axum ===
    pub use axum::{
        Router,
        extract::Request,
        middleware::Next,
        response::{IntoResponse, Response},
    };
}
