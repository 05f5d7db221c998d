//! Configuration for dispatchd.
//!
//! Loads settings from /etc/fleet/dispatchd.toml or /var/lib/fleet/dispatchd.toml,
//! falling back to compiled defaults.

use anyhow::{Context, Result};
use fleet_core::RiskThresholds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Primary config file path
pub const CONFIG_PATH: &str = "/etc/fleet/dispatchd.toml";

/// Fallback config file path
pub const FALLBACK_CONFIG_PATH: &str = "/var/lib/fleet/dispatchd.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    // Localhost only; the web surfaces reach us through their own backends
    "127.0.0.1:7810".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Datastore configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Append-only audit log path (JSONL)
    #[serde(default = "default_audit_path")]
    pub audit_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/var/lib/fleet/dispatch.db")
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("/var/lib/fleet/audit.jsonl")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            audit_path: default_audit_path(),
        }
    }
}

/// Risk scorer thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Score at which a vehicle becomes MEDIUM risk
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: u32,

    /// Score at which a vehicle becomes HIGH risk
    #[serde(default = "default_high_threshold")]
    pub high_threshold: u32,
}

fn default_medium_threshold() -> u32 {
    25 // ~2,500 mi or ~6 months overdue
}

fn default_high_threshold() -> u32 {
    50
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            medium_threshold: default_medium_threshold(),
            high_threshold: default_high_threshold(),
        }
    }
}

impl RiskConfig {
    pub fn thresholds(&self) -> RiskThresholds {
        RiskThresholds {
            medium: self.medium_threshold,
            high: self.high_threshold,
        }
    }
}

/// Lifecycle guard tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Minimum closing-notes length, in characters after trimming
    #[serde(default = "default_min_notes_len")]
    pub min_notes_len: usize,
}

fn default_min_notes_len() -> usize {
    fleet_core::validator::DEFAULT_MIN_NOTES_LEN
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            min_notes_len: default_min_notes_len(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub risk: RiskConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Load config from the standard paths, or return defaults.
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(FALLBACK_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save the default config to a path (for init).
    pub fn save_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("write config {}", path.display()))?;
        info!("Saved default config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:7810");
        assert_eq!(config.risk.medium_threshold, 25);
        assert_eq!(config.risk.high_threshold, 50);
        assert_eq!(config.dispatch.min_notes_len, 10);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
listen_addr = "0.0.0.0:9000"

[risk]
high_threshold = 80
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.risk.high_threshold, 80);
        // Defaults for missing fields
        assert_eq!(config.risk.medium_threshold, 25);
        assert_eq!(config.dispatch.min_notes_len, 10);
    }

    #[test]
    fn test_thresholds_projection() {
        let config = Config::default();
        let thresholds = config.risk.thresholds();
        assert_eq!(thresholds.medium, 25);
        assert_eq!(thresholds.high, 50);
    }

    #[test]
    fn test_save_default_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dispatchd.toml");
        Config::save_default(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.listen_addr, "127.0.0.1:7810");
    }
}
