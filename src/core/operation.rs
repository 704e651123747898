//! The closed set of CRUD operations and their routing table

use axum::http::Method;
use std::fmt;

/// A named CRUD operation exposed by [`CrudController`](crate::server::CrudController).
///
/// Each operation maps to exactly one HTTP method and path, one core handler
/// and one method of [`CrudMiddleware`](crate::core::middleware::CrudMiddleware).
/// Adding an operation means extending this enum, [`Operation::route`] and
/// the middleware dispatch table together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Paginate,
    GetById,
    Create,
    BulkCreate,
    Update,
    BulkUpdate,
    Delete,
    SoftDelete,
    Restore,
    Search,
    Count,
}

impl Operation {
    /// Every operation, in route registration order
    pub const ALL: [Operation; 12] = [
        Operation::List,
        Operation::Paginate,
        Operation::Search,
        Operation::Count,
        Operation::GetById,
        Operation::Create,
        Operation::BulkCreate,
        Operation::Update,
        Operation::BulkUpdate,
        Operation::Restore,
        Operation::Delete,
        Operation::SoftDelete,
    ];

    /// HTTP method and axum path template for this operation
    pub fn route(&self) -> (Method, &'static str) {
        match self {
            Operation::List => (Method::GET, "/"),
            Operation::Paginate => (Method::GET, "/paginate"),
            Operation::Search => (Method::GET, "/search"),
            Operation::Count => (Method::GET, "/count"),
            Operation::GetById => (Method::GET, "/{id}"),
            Operation::Create => (Method::POST, "/"),
            Operation::BulkCreate => (Method::POST, "/bulk-create"),
            Operation::Update => (Method::PUT, "/{id}"),
            Operation::BulkUpdate => (Method::PUT, "/bulk-update"),
            Operation::Restore => (Method::PUT, "/restore/{id}"),
            Operation::Delete => (Method::DELETE, "/{id}"),
            Operation::SoftDelete => (Method::DELETE, "/soft-delete/{id}"),
        }
    }

    pub fn method(&self) -> Method {
        self.route().0
    }

    pub fn path(&self) -> &'static str {
        self.route().1
    }

    /// Operation name as used in logs and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Paginate => "paginate",
            Operation::GetById => "getById",
            Operation::Create => "create",
            Operation::BulkCreate => "bulkCreate",
            Operation::Update => "update",
            Operation::BulkUpdate => "bulkUpdate",
            Operation::Delete => "delete",
            Operation::SoftDelete => "softDelete",
            Operation::Restore => "restore",
            Operation::Search => "search",
            Operation::Count => "count",
        }
    }

    /// Whether the operation reads a JSON request body
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            Operation::Create | Operation::BulkCreate | Operation::Update | Operation::BulkUpdate
        )
    }

    /// Whether the request body is a JSON array of payloads
    pub fn is_bulk(&self) -> bool {
        matches!(self, Operation::BulkCreate | Operation::BulkUpdate)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
