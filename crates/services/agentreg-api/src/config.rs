use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Configuration for the registry service.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP API binds to.
    pub listen_addr: SocketAddr,

    /// Directory for the sled database. The ledger is kept in memory when unset.
    pub storage_path: Option<PathBuf>,

    /// Optional separate listener for Prometheus scraping. `/metrics` is
    /// always served on the API listener as well.
    pub metrics_addr: Option<SocketAddr>,

    /// Optional log filter (e.g., "info", "agentreg_ledger=debug"). `RUST_LOG` wins.
    pub log_level: Option<String>,

    /// Notifications buffered per websocket subscriber before it lags.
    pub event_buffer: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8082)),
            storage_path: None,
            metrics_addr: None,
            log_level: None,
            event_buffer: 100,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse service configuration")
    }

    /// Read the TOML file at `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {:?}", path))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid configuration file: {:?}", path))
    }
}
