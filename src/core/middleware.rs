//! Per-operation middleware providers
//!
//! A [`CrudMiddleware`] exposes one async method per [`Operation`]. The
//! controller wraps every intercepted operation's core handler with the
//! provider methods in configured order:
//!
//! ```text
//! request ─▶ providers[0].op ─▶ providers[1].op ─▶ … ─▶ core handler
//! ```
//!
//! A method continues the chain with `next.run(request).await` or answers
//! on its own (for example a validator returning 400). The default for every
//! method is to continue.

use crate::core::operation::Operation;
use async_trait::async_trait;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Middleware provider with one hook per CRUD operation
///
/// # Example
///
/// ```rust,ignore
/// struct AuditHeader;
///
/// #[async_trait]
/// impl CrudMiddleware for AuditHeader {
///     async fn list(&self, request: Request, next: Next) -> Response {
///         let mut response = next.run(request).await;
///         response.headers_mut().insert("x-audited", HeaderValue::from_static("yes"));
///         response
///     }
/// }
/// ```
#[async_trait]
pub trait CrudMiddleware: Send + Sync + 'static {
    /// Whether this provider has a hook for `operation`.
    ///
    /// Operations that are not intercepted get no layer at all.
    fn intercepts(&self, _operation: Operation) -> bool {
        true
    }

    async fn list(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn paginate(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn get_by_id(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn create(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn bulk_create(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn update(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn bulk_update(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn delete(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn soft_delete(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn restore(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn search(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }

    async fn count(&self, request: Request, next: Next) -> Response {
        next.run(request).await
    }
}

/// Route a request to the provider hook matching `operation`
pub fn dispatch(
    provider: Arc<dyn CrudMiddleware>,
    operation: Operation,
    request: Request,
    next: Next,
) -> BoxFuture<'static, Response> {
    Box::pin(async move {
        match operation {
            Operation::List => provider.list(request, next).await,
            Operation::Paginate => provider.paginate(request, next).await,
            Operation::GetById => provider.get_by_id(request, next).await,
            Operation::Create => provider.create(request, next).await,
            Operation::BulkCreate => provider.bulk_create(request, next).await,
            Operation::Update => provider.update(request, next).await,
            Operation::BulkUpdate => provider.bulk_update(request, next).await,
            Operation::Delete => provider.delete(request, next).await,
            Operation::SoftDelete => provider.soft_delete(request, next).await,
            Operation::Restore => provider.restore(request, next).await,
            Operation::Search => provider.search(request, next).await,
            Operation::Count => provider.count(request, next).await,
        }
    })
}
