//! Configuration loading and management
//!
//! Configuration comes from a YAML file, environment variables, or both:
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 3000
//! crud:
//!   pagination:
//!     default_page: 1
//!     default_limit: 25
//! openid:
//!   server_url: https://sso.example.com
//!   realm: acme
//!   client_id: company-api
//! ```

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable names read by [`OpenIdConfig::from_env`] and [`ServerConfig::from_env`]
pub mod env {
    pub const KEYCLOAK_SERVER: &str = "KEYCLOAK_SERVER";
    pub const KEYCLOAK_REALM: &str = "KEYCLOAK_REALM";
    pub const KEYCLOAK_CLIENT_ID: &str = "KEYCLOAK_CLIENT_ID";
    pub const KEYCLOAK_CLIENT_SECRET: &str = "KEYCLOAK_CLIENT_SECRET";
    pub const KEYCLOAK_AUDIENCE: &str = "KEYCLOAK_AUDIENCE";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub crud: CrudConfig,

    /// Identity provider settings; `None` leaves routes unprotected
    #[serde(default)]
    pub openid: Option<OpenIdConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Read `HOST` and `PORT`, falling back to the defaults when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = optional_env(env::HOST).unwrap_or_else(default_host);
        let port = match optional_env(env::PORT) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnv {
                name: env::PORT.to_string(),
                value: raw,
            })?,
            None => default_port(),
        };
        Ok(Self { host, port })
    }

    /// `host:port` string suitable for binding a listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for every CRUD controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrudConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Fallback values used when `page` or `limit` are absent or malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page")]
    pub default_page: usize,

    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: default_page(),
            default_limit: default_limit(),
        }
    }
}

/// OpenID Connect provider settings (Keycloak layout)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdConfig {
    /// Base URL of the identity server, e.g. `https://sso.example.com`
    pub server_url: String,

    pub realm: String,

    pub client_id: String,

    #[serde(default)]
    pub client_secret: Option<String>,

    /// Expected `aud` claim; not checked when absent
    #[serde(default)]
    pub audience: Option<String>,

    /// Timeout for every request to the identity server
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl OpenIdConfig {
    pub fn new(
        server_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: None,
            audience: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Read the `KEYCLOAK_*` variables.
    ///
    /// `KEYCLOAK_SERVER`, `KEYCLOAK_REALM` and `KEYCLOAK_CLIENT_ID` are
    /// required; the secret and audience are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            required_env(env::KEYCLOAK_SERVER)?,
            required_env(env::KEYCLOAK_REALM)?,
            required_env(env::KEYCLOAK_CLIENT_ID)?,
        );
        config.client_secret = optional_env(env::KEYCLOAK_CLIENT_SECRET);
        config.audience = optional_env(env::KEYCLOAK_AUDIENCE);
        Ok(config)
    }

    /// Issuer URL of the realm, e.g. `https://sso.example.com/realms/acme`
    pub fn issuer_url(&self) -> String {
        format!("{}/realms/{}", self.server_url.trim_end_matches('/'), self.realm)
    }

    /// Location of the provider's discovery document
    pub fn discovery_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.issuer_url())
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    optional_env(name).ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
}
