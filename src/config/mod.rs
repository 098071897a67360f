pub mod runtime;
pub use runtime::{new_runtime_config, RuntimeConfig, SharedRuntimeConfig};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Complete Worldcast configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldcastConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

/// HTTP/WebSocket listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under /static
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Stats reporting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// How often to log engine stats (seconds, 0 disables)
    #[serde(default = "default_report_interval")]
    pub report_interval_seconds: u64,
}

fn default_report_interval() -> u64 {
    60
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            report_interval_seconds: default_report_interval(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<WorldcastConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
    let config: WorldcastConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config {}", path))?;
    Ok(config)
}

/// Load from `WORLDCAST_CONFIG` if set, defaults otherwise
pub fn load_from_env() -> Result<WorldcastConfig> {
    match std::env::var("WORLDCAST_CONFIG") {
        Ok(path) => load_config(&path),
        Err(_) => Ok(WorldcastConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WorldcastConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.static_dir, PathBuf::from("static"));
        assert_eq!(config.stats.report_interval_seconds, 60);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            static_dir = "/srv/world"

            [stats]
            report_interval_seconds = 5
        "#;

        let config: WorldcastConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.server.static_dir, PathBuf::from("/srv/world"));
        assert_eq!(config.stats.report_interval_seconds, 5);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections and fields use defaults
        let toml = r#"
            [server]
            port = 3000
        "#;

        let config: WorldcastConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0"); // Default
        assert_eq!(config.stats.report_interval_seconds, 60); // Default
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stats]\nreport_interval_seconds = 0").unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.stats.report_interval_seconds, 0);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/nonexistent/worldcast.toml").is_err());
    }
}
