use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{Dataset, Person};
use crate::search::SearchConfig;
use crate::websocket::WebSocketConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Search pipeline configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Initial dataset
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// WebSocket streaming configuration
    #[serde(default)]
    pub websocket: WebSocketConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// The config file path is taken from `CONFIG_PATH`, falling back to
    /// `config/default.toml`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load_from(config_path)
    }

    /// Load configuration layered over the embedded defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&path).required(false))
            // Override with environment variables (prefix: DEBOUNCED_SEARCH_)
            .add_source(
                config::Environment::with_prefix("DEBOUNCED_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

/// Records loaded into the pipeline at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default)]
    pub people: Vec<Person>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            people: default_people(),
        }
    }
}

impl DatasetConfig {
    pub fn to_dataset(&self) -> Dataset {
        Dataset::new(self.people.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: default_true(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "debounced-search".to_string()
}

fn default_true() -> bool {
    true
}

fn default_people() -> Vec<Person> {
    ["Tarek", "Omar", "Ammar", "Nisreen", "Aya"]
        .into_iter()
        .map(|first_name| Person::new(first_name, "Hendi"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
        assert_eq!(DatasetConfig::default().people.len(), 5);
    }

    #[test]
    fn test_embedded_defaults_load() {
        let config = Config::load_from("does/not/exist.toml").unwrap();

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.processing_delay_ms, 500);
        assert_eq!(config.dataset.people.len(), 5);
        assert_eq!(config.dataset.people[0], Person::new("Tarek", "Hendi"));
        assert_eq!(config.websocket.heartbeat_interval_secs, 30);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
http_port = 9999

[search]
debounce_ms = 150

[websocket]
heartbeat_interval_secs = 5

[[dataset.people]]
first_name = "Ada"
last_name = "Lovelace"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.server.http_port, 9999);
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.processing_delay_ms, 500);
        assert_eq!(config.websocket.heartbeat_interval_secs, 5);
        assert_eq!(config.dataset.people[0], Person::new("Ada", "Lovelace"));
    }
}
