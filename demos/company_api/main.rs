//! Company API example
//!
//! Serves the twelve CRUD routes for companies under `/companies`:
//! - request bodies are checked by a `RequestValidator`
//! - every `list` response carries an `x-served-by` header from a custom middleware
//! - when the `KEYCLOAK_*` variables are set, the routes require a bearer
//!   token and `POST /auth/token` exchanges credentials for one
//!
//! Run with `cargo run --example company_api [config.yaml]`.

use axum::http::HeaderValue;
use axum::routing::post;
use axum::{Json, extract::State};
use crud::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

impl_crud_entity!(Company, "companies", {
    name: String,
    cik: String,
    #[serde(default)]
    entity_type: String,
    #[serde(default)]
    sic_description: String,
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default)]
    website: String,
});

/// Shape accepted by `create` and `bulkCreate`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct NewCompany {
    #[validate(length(min = 1, max = 200))]
    name: String,

    #[validate(length(equal = 10, message = "CIK must have 10 digits"))]
    cik: String,

    #[validate(url)]
    website: Option<String>,
}

/// Shape accepted by `update` and `bulkUpdate`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct CompanyChanges {
    #[validate(length(min = 1, max = 200))]
    name: Option<String>,

    #[validate(url)]
    website: Option<String>,
}

/// Tags list responses with the serving instance
struct ServedBy;

#[async_trait]
impl CrudMiddleware for ServedBy {
    fn intercepts(&self, operation: Operation) -> bool {
        operation == Operation::List
    }

    async fn list(&self, request: Request, next: Next) -> Response {
        let mut response = next.run(request).await;
        response
            .headers_mut()
            .insert("x-served-by", HeaderValue::from_static("company-api"));
        response
    }
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn issue_token(
    State(provider): State<Arc<dyn IdentityProvider>>,
    Json(credentials): Json<Credentials>,
) -> std::result::Result<Json<TokenSet>, AuthError> {
    let tokens = provider
        .get_token(&credentials.username, &credentials.password)
        .await?;
    Ok(Json(tokens))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,crud=debug")),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig {
            server: ServerConfig::from_env()?,
            ..AppConfig::default()
        },
    };
    if config.openid.is_none() {
        config.openid = OpenIdConfig::from_env().ok();
    }

    let repository = InMemoryRepository::with_entities([
        Company::new(
            "Apple Inc.".to_string(),
            "0000320193".to_string(),
            "operating".to_string(),
            "Electronic Computers".to_string(),
            vec!["AAPL".to_string()],
            "https://www.apple.com".to_string(),
        ),
        Company::new(
            "Microsoft Corp".to_string(),
            "0000789019".to_string(),
            "operating".to_string(),
            "Services-Prepackaged Software".to_string(),
            vec!["MSFT".to_string()],
            "https://www.microsoft.com".to_string(),
        ),
    ]);

    let companies = CrudController::builder(repository)
        .with_config(config.crud.clone())
        .with_middleware(ServedBy)
        .with_middleware(RequestValidator::<NewCompany, CompanyChanges>::new())
        .build();

    let mut server = ServerBuilder::new();
    match &config.openid {
        Some(openid) => {
            let client = OpenIdClient::new(openid.clone())?;
            if let Err(e) = client.init().await {
                tracing::warn!("Identity provider not reachable yet, will retry on first request: {}", e);
            }
            let provider: Arc<dyn IdentityProvider> = Arc::new(client);

            tracing::info!(issuer = %openid.issuer_url(), "Company routes require a bearer token");
            server = server
                .with_custom_routes(
                    Router::new()
                        .route("/auth/token", post(issue_token))
                        .with_state(provider.clone()),
                )
                .with_identity_provider(provider)
                .mount_protected("/companies", &companies);
        }
        None => {
            tracing::warn!("KEYCLOAK_* variables not set, company routes are public");
            server = server.mount("/companies", &companies);
        }
    }

    server.serve(&config.server.address()).await
}
