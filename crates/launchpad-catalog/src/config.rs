//! Configuration for catalogd

use crate::error::DaemonError;
use launchpad_auth::{SigningSecret, TokenVerifier};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Default catalog listen port
pub const DEFAULT_PORT: u16 = 8081;

/// Main catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Inbound token verification
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            enable_cors: true,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    #[default]
    Memory,

    /// PostgreSQL storage
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Pool acquire timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,

        /// Upper bound on any single query, in seconds
        #[serde(default = "default_query_timeout")]
        query_timeout_secs: u64,
    },
}

/// Inbound token verification settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret. Usually supplied through `JWT_SECRET`.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Accepted `iss` values; empty accepts any issuer
    #[serde(default)]
    pub trusted_issuers: Vec<String>,
}

impl AuthConfig {
    /// The configured secret, or a configuration error if none was given
    pub fn signing_secret(&self) -> Result<SigningSecret, DaemonError> {
        let raw = self
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DaemonError::Config("JWT_SECRET environment variable is required".to_string())
            })?;
        SigningSecret::new(raw).map_err(|e| DaemonError::Config(e.to_string()))
    }

    pub fn verifier(&self) -> Result<TokenVerifier, DaemonError> {
        let secret = self.signing_secret()?;
        Ok(TokenVerifier::new(&secret).with_trusted_issuers(&self.trusted_issuers))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_query_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CatalogConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CatalogConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // LAUNCHPAD_SERVER__LISTEN_ADDR, LAUNCHPAD_STORAGE__URL, ...
        builder = builder.add_source(
            config::Environment::with_prefix("LAUNCHPAD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
