//! OpenID Connect client for Keycloak-style identity servers
//!
//! The client starts UNINITIALIZED. [`IdentityProvider::init`] (or the first
//! call to `verify`, `get_token` or `refresh_token`) fetches the discovery
//! document at `{server_url}/realms/{realm}/.well-known/openid-configuration`,
//! then downloads the signing keys from its `jwks_uri`. A failed discovery
//! leaves the client uninitialized so the next call retries.

use crate::config::OpenIdConfig;
use crate::core::auth::{Identity, IdentityProvider, TokenSet};
use crate::core::error::AuthError;
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Subset of the discovery document used by the client
#[derive(Debug, Clone, Deserialize)]
struct ProviderMetadata {
    issuer: String,
    token_endpoint: String,
    jwks_uri: String,
}

/// Everything learned during discovery
struct ProviderState {
    issuer: String,
    token_endpoint: String,
    /// Signing keys by key id
    keys: HashMap<String, DecodingKey>,
}

/// [`IdentityProvider`] backed by an OpenID Connect server
///
/// # Example
///
/// ```rust,ignore
/// let client = OpenIdClient::new(OpenIdConfig::from_env()?)?;
/// client.init().await?;
/// let tokens = client.get_token("alice", "secret").await?;
/// let identity = client.verify(&tokens.access_token).await?;
/// ```
pub struct OpenIdClient {
    config: OpenIdConfig,
    http: reqwest::Client,
    state: OnceCell<ProviderState>,
}

impl OpenIdClient {
    pub fn new(config: OpenIdConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http,
            state: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &OpenIdConfig {
        &self.config
    }

    /// Whether discovery has completed
    pub fn is_initialized(&self) -> bool {
        self.state.initialized()
    }

    async fn state(&self) -> Result<&ProviderState, AuthError> {
        self.state.get_or_try_init(|| self.discover()).await
    }

    async fn discover(&self) -> Result<ProviderState, AuthError> {
        let url = self.config.discovery_url();
        tracing::info!(url = %url, "Discovering identity provider");

        let metadata: ProviderMetadata = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AuthError::Discovery(format!("{}: {}", url, e)))?
            .json()
            .await
            .map_err(|e| AuthError::Discovery(format!("Invalid discovery document: {}", e)))?;

        let jwks: JwkSet = self
            .http
            .get(&metadata.jwks_uri)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AuthError::Discovery(format!("{}: {}", metadata.jwks_uri, e)))?
            .json()
            .await
            .map_err(|e| AuthError::Discovery(format!("Invalid key set: {}", e)))?;

        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                tracing::warn!("Skipping signing key without a key id");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => tracing::warn!(kid = %kid, "Skipping unusable signing key: {}", e),
            }
        }

        if keys.is_empty() {
            return Err(AuthError::Discovery(
                "No usable signing keys in the key set".to_string(),
            ));
        }

        tracing::info!(
            issuer = %metadata.issuer,
            keys = keys.len(),
            "Identity provider initialized"
        );

        Ok(ProviderState {
            issuer: metadata.issuer,
            token_endpoint: metadata.token_endpoint,
            keys,
        })
    }

    async fn request_token(&self, grant: &[(&str, &str)]) -> Result<TokenSet, AuthError> {
        let state = self.state().await?;

        let mut form: Vec<(&str, &str)> = vec![("client_id", self.config.client_id.as_str())];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.as_str()));
        }
        form.extend_from_slice(grant);

        let response = self
            .http
            .post(&state.token_endpoint)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token request rejected");
            return Err(AuthError::TokenRequest {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for OpenIdClient {
    async fn init(&self) -> Result<(), AuthError> {
        self.state().await.map(|_| ())
    }

    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let state = self.state().await?;

        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let key = match &header.kid {
            Some(kid) => state.keys.get(kid),
            // A single published key needs no key id
            None if state.keys.len() == 1 => state.keys.values().next(),
            None => None,
        }
        .ok_or_else(|| AuthError::InvalidToken(format!("Unknown key id {:?}", header.kid)))?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[state.issuer.as_str()]);
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }

        let data = decode::<Value>(token, key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(Identity::from_claims(data.claims))
    }

    async fn get_token(&self, username: &str, password: &str) -> Result<TokenSet, AuthError> {
        self.request_token(&[
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
        ])
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}
