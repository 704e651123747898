//! ServerBuilder for fluent API to build HTTP servers

use super::controller::CrudController;
use crate::core::auth::{IdentityProvider, authorize};
use crate::core::entity::Entity;
use anyhow::{Result, anyhow};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// One mounted route table
struct Mount {
    path: String,
    router: Router,
    protected: bool,
}

/// Builder for creating HTTP servers from CRUD controllers
///
/// # Example
///
/// ```ignore
/// let companies = CrudController::builder(InMemoryRepository::<Company>::new()).build();
///
/// ServerBuilder::new()
///     .with_identity_provider(Arc::new(OpenIdClient::new(config)?))
///     .mount_protected("/companies", &companies)
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    mounts: Vec<Mount>,
    custom_routes: Vec<Router>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            mounts: Vec::new(),
            custom_routes: Vec::new(),
            identity_provider: None,
        }
    }

    /// Set the identity provider used by protected mounts
    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    /// Mount a controller's routes under `path`
    pub fn mount<T: Entity>(self, path: &str, controller: &CrudController<T>) -> Self {
        self.mount_router(path, controller.routes(), false)
    }

    /// Mount a controller's routes under `path`, behind bearer token authorization
    pub fn mount_protected<T: Entity>(self, path: &str, controller: &CrudController<T>) -> Self {
        self.mount_router(path, controller.routes(), true)
    }

    fn mount_router(mut self, path: &str, router: Router, protected: bool) -> Self {
        self.mounts.push(Mount {
            path: normalize_path(path),
            router,
            protected,
        });
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes that don't fit the CRUD pattern, such as a login
    /// endpoint exchanging credentials for tokens.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router
    ///
    /// Fails when a protected mount exists but no identity provider was set.
    pub fn build(self) -> Result<Router> {
        let mut app = health_routes();

        for mount in self.mounts {
            let mut router = mount.router;

            if mount.protected {
                let provider = self.identity_provider.clone().ok_or_else(|| {
                    anyhow!(
                        "Routes mounted at '{}' are protected but no identity provider is set. Call .with_identity_provider()",
                        mount.path
                    )
                })?;
                router = router.layer(axum::middleware::from_fn_with_state(provider, authorize));
            }

            tracing::debug!(path = %mount.path, protected = mount.protected, "Mounting CRUD routes");

            app = if mount.path == "/" {
                app.merge(router)
            } else {
                app.nest(&mount.path, router)
            };
        }

        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
