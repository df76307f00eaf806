//! Soiree Graph
//!
//! HTTP backend for the soiree app over a Neo4j graph:
//! - Messaging between users and groups
//! - Establishment menus (consos) and orders
//! - User preferences over establishment types
//! - A typed HTTP client for the same endpoints

pub mod api;
pub mod client;
pub mod metrics;
pub mod neo4j;
pub mod service;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Upper bound on concurrent queries
    pub max_connections: usize,
    /// How long a query waits for a free connection before failing
    pub acquire_timeout_secs: u64,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "soiree".into(),
            max_connections: 16,
            acquire_timeout_secs: 5,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub neo4j_max_connections: usize,
    pub neo4j_acquire_timeout_secs: u64,
    pub server_port: u16,
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing file
    /// falls back to env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let config = Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            neo4j_max_connections: env_parsed("NEO4J_MAX_CONNECTIONS")
                .unwrap_or(yaml.neo4j.max_connections),
            neo4j_acquire_timeout_secs: env_parsed("NEO4J_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or(yaml.neo4j.acquire_timeout_secs),
            server_port: env_parsed("SERVER_PORT").unwrap_or(yaml.server.port),
        };

        if config.neo4j_max_connections == 0 {
            anyhow::bail!("neo4j.max_connections must be at least 1");
        }
        Ok(config)
    }

    /// Connection acquisition timeout
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.neo4j_acquire_timeout_secs)
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Graph store, instrumented with logging and metrics
    pub neo4j: Arc<dyn neo4j::GraphStore>,
    pub metrics: Arc<metrics::OperationMetrics>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and wire the instrumented store
    pub async fn new(config: Config) -> Result<Self> {
        let client = neo4j::Neo4jClient::new(
            &config.neo4j_uri,
            &config.neo4j_user,
            &config.neo4j_password,
            config.neo4j_max_connections,
            config.acquire_timeout(),
        )
        .await?;

        let metrics = Arc::new(metrics::OperationMetrics::new());
        let neo4j = Arc::new(neo4j::InstrumentedStore::new(
            Arc::new(client),
            metrics.clone(),
        ));

        Ok(Self {
            neo4j,
            metrics,
            config: Arc::new(config),
        })
    }

    /// Build the state handed to HTTP handlers
    pub fn server_state(&self) -> api::SoireeState {
        Arc::new(api::ServerState {
            service: service::SoireeService::new(self.neo4j.clone()),
            metrics: self.metrics.clone(),
        })
    }
}

/// Connect, build the router and serve until Ctrl+C / SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j at {}", state.config.neo4j_uri);

    let router = api::create_router(state.server_state());

    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ============================================================================
// Tests
// ============================================================================
