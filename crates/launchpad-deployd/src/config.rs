//! Configuration for deployd

use crate::error::DaemonError;
use launchpad_auth::{SigningSecret, DEFAULT_TOKEN_TTL_SECS};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Default deployment daemon listen port
pub const DEFAULT_PORT: u16 = 8082;

/// Catalog base URL when `CORE_SERVICE_URL` is not set
pub const DEFAULT_CORE_SERVICE_URL: &str = "http://localhost:8081";

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploydConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound token settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// The catalog consulted before a deployment is recorded
    #[serde(default)]
    pub core: CoreServiceConfig,

    /// The activation endpoint
    #[serde(default)]
    pub effector: EffectorConfig,

    /// How activations are scheduled
    #[serde(default)]
    pub activation: ActivationConfig,

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

/// Service token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret. Usually supplied through `JWT_SECRET`.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Lifetime of minted tokens in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl(),
        }
    }
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
}

/// Catalog connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreServiceConfig {
    /// Base URL. Usually supplied through `CORE_SERVICE_URL`.
    #[serde(default = "default_core_url")]
    pub url: String,

    /// Lookup timeout in seconds
    #[serde(default = "default_core_timeout")]
    pub timeout_secs: u64,
}

impl Default for CoreServiceConfig {
    fn default() -> Self {
        Self {
            url: default_core_url(),
            timeout_secs: default_core_timeout(),
        }
    }
}

/// Activation endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectorConfig {
    #[serde(default = "default_effector_url")]
    pub url: String,

    #[serde(default = "default_effector_timeout")]
    pub timeout_secs: u64,
}

impl Default for EffectorConfig {
    fn default() -> Self {
        Self {
            url: default_effector_url(),
            timeout_secs: default_effector_timeout(),
        }
    }
}

/// How activations are run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// One unsupervised task per deployment
    #[default]
    Detached,

    /// A bounded queue and a fixed set of workers
    Pool,
}

/// Activation scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationConfig {
    #[serde(default)]
    pub mode: ActivationMode,

    /// Worker count in pool mode
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Queue capacity in pool mode
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            mode: ActivationMode::Detached,
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
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

// Default value helpers
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

fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_core_url() -> String {
    DEFAULT_CORE_SERVICE_URL.to_string()
}

fn default_core_timeout() -> u64 {
    crate::validator::DEFAULT_TIMEOUT.as_secs()
}

fn default_effector_url() -> String {
    crate::effector::DEFAULT_EFFECTOR_URL.to_string()
}

fn default_effector_timeout() -> u64 {
    crate::effector::DEFAULT_TIMEOUT.as_secs()
}

fn default_workers() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DeploydConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DeploydConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // LAUNCHPAD_ACTIVATION__MODE=pool, LAUNCHPAD_EFFECTOR__URL=...
        builder = builder.add_source(
            config::Environment::with_prefix("LAUNCHPAD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
