//! deployd - deployment daemon
//!
//! Accepts deployment requests for catalog services, records them as
//! `Pending` and settles each one in the background.

use clap::Parser;
use launchpad_deployd::{error::DaemonResult, DaemonError, DeploydConfig, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Deployment daemon CLI
#[derive(Parser)]
#[command(name = "deployd")]
#[command(about = "Launchpad deployment daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "LAUNCHPAD_CONFIG")]
    config: Option<String>,

    /// Listen address (overrides the configuration file)
    #[arg(short, long, env = "LAUNCHPAD_LISTEN_ADDR")]
    listen: Option<String>,

    /// Shared secret for service tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Catalog base URL
    #[arg(long, env = "CORE_SERVICE_URL")]
    core_service_url: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "LAUNCHPAD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "LAUNCHPAD_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = DeploydConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(secret) = cli.jwt_secret {
        config.auth.jwt_secret = Some(secret);
    }
    if let Some(url) = cli.core_service_url {
        config.core.url = url;
    }

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        activation = ?config.activation.mode,
        "Starting deployd"
    );

    let server = Server::new(config).await?;
    server.run().await
}
