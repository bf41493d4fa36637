//! Configuration for the skillbridge server.
//!
//! [`BridgeConfig`] is loaded from `skillbridge.toml` (when present) and then
//! overridden by environment variables, each applied independently:
//!
//! 1. Built-in defaults ([`BridgeConfig::default()`])
//! 2. `./skillbridge.toml`
//! 3. `SKILLBRIDGE_*` environment variables (plus bare `PORT`, which cloud
//!    platforms set automatically)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// Top-level configuration for a skillbridge instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Address the HTTP read surface binds to.
    pub host: String,
    /// Port for the HTTP read surface.
    pub port: u16,
    /// Base URL of the downstream Talent Management Skills API.
    pub tm_api_base_url: String,
    /// API key sent as `X-API-Key`; empty means no authentication header.
    pub tm_api_key: String,
    /// Per-request timeout for Talent API calls, in seconds.
    pub tm_api_timeout_secs: f64,
    /// Path to the SQLite audit database.
    pub audit_db_path: PathBuf,
    /// Origins allowed by CORS (the monitoring dashboard); empty allows all.
    pub cors_origins: Vec<String>,
    /// Directory holding static MCP resources (schema, business questions).
    pub resources_dir: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            tm_api_base_url: "http://localhost:8000".to_string(),
            tm_api_key: String::new(),
            tm_api_timeout_secs: 30.0,
            audit_db_path: PathBuf::from("audit.db"),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:4173".to_string(),
            ],
            resources_dir: PathBuf::from("resources"),
        }
    }
}

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "skillbridge.toml";

impl BridgeConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, BridgeError> {
        toml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, BridgeError> {
        toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Load configuration: defaults, then `./skillbridge.toml` if present,
    /// then environment overrides.
    pub fn load() -> Result<Self, BridgeError> {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(BridgeError::Config(format!(
                    "failed to read {CONFIG_FILE}: {e}"
                )))
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `SKILLBRIDGE_*` (and `PORT`) environment overrides in place.
    ///
    /// Each variable is read independently; an unset variable leaves the
    /// current value untouched.
    pub fn apply_env_overrides(&mut self) -> Result<(), BridgeError> {
        if let Ok(host) = std::env::var("SKILLBRIDGE_HOST") {
            self.host = host;
        }
        // Cloud platforms export a bare PORT; SKILLBRIDGE_PORT wins if both set.
        for var in ["PORT", "SKILLBRIDGE_PORT"] {
            if let Ok(port) = std::env::var(var) {
                self.port = port
                    .parse()
                    .map_err(|e| BridgeError::Config(format!("invalid {var}: {e}")))?;
            }
        }
        if let Ok(url) = std::env::var("SKILLBRIDGE_TM_API_BASE_URL") {
            self.tm_api_base_url = url;
        }
        if let Ok(key) = std::env::var("SKILLBRIDGE_TM_API_KEY") {
            self.tm_api_key = key;
        }
        if let Ok(timeout) = std::env::var("SKILLBRIDGE_TM_API_TIMEOUT_SECS") {
            self.tm_api_timeout_secs = timeout.parse().map_err(|e| {
                BridgeError::Config(format!("invalid SKILLBRIDGE_TM_API_TIMEOUT_SECS: {e}"))
            })?;
        }
        if let Ok(path) = std::env::var("SKILLBRIDGE_AUDIT_DB_PATH") {
            self.audit_db_path = PathBuf::from(path);
        }
        if let Ok(origins) = std::env::var("SKILLBRIDGE_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Ok(dir) = std::env::var("SKILLBRIDGE_RESOURCES_DIR") {
            self.resources_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// The socket address for the HTTP read surface.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
