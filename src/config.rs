//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. SUBDIVISION_CONFIG environment variable
//! 3. Default: config/subdivision.toml

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tracing::warn;

pub const CONFIG_ENV_VAR: &str = "SUBDIVISION_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/subdivision.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is not set
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// File name stem used when the form has no folium
    pub default_file_stem: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            default_file_stem: "subdivision".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub document: DocumentConfig,
}

impl Config {
    /// Explicit path first, then the environment, then the default location
    pub fn resolve_config_path(explicit: Option<&str>) -> String {
        if let Some(path) = explicit {
            return path.to_string();
        }
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return path;
        }
        DEFAULT_CONFIG_PATH.to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration - tries the TOML file first, falls back to defaults.
    ///
    /// The load error is handed back instead of logged, since callers read
    /// the logging setup from the returned config.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> (Self, Option<anyhow::Error>) {
        match Self::from_file(path.as_ref()) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Report a fallback from [`Config::load_or_default`] once logging is up
    pub fn warn_on_fallback(load_error: Option<&anyhow::Error>) {
        if let Some(e) = load_error {
            warn!(error = %format!("{:#}", e), "using default configuration");
        }
    }

    pub fn server_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.bind_address, self.server.port);
        addr.parse()
            .with_context(|| format!("Invalid server address {}", addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.filter, "info");
        assert!(!config.logging.json);
        assert_eq!(config.document.default_file_stem, "subdivision");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_server_addr() {
        let mut config = Config::default();
        config.server.bind_address = "127.0.0.1".to_string();
        assert_eq!(config.server_addr().unwrap().to_string(), "127.0.0.1:3000");

        config.server.bind_address = "not an address".to_string();
        assert!(config.server_addr().is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(
            Config::resolve_config_path(Some("custom.toml")),
            "custom.toml"
        );
    }
}
