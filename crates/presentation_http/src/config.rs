//! Server configuration
//!
//! Loaded from defaults, an optional `config.toml` in the working directory,
//! and `FAULT_SERVER__*` environment variables (e.g.
//! `FAULT_SERVER__FAULT__PERCENT_OF_REQUESTS=5`).

use fault::FaultConfig;
use serde::{Deserialize, Serialize};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FAULT_SERVER";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Fault injection configuration
    #[serde(default)]
    pub fault: FaultConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Time to wait for open connections on shutdown, in seconds
    #[serde(default)]
    pub shutdown_timeout_secs: Option<u64>,

    /// Log format: "json" for structured JSON logs, "text" for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: None,
            log_format: default_log_format(),
        }
    }
}

impl ServerConfig {
    /// Address to bind to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from `config.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name("config").required(false))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Parse configuration from a TOML document, without the environment
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("fault.path_blacklist")
        .with_list_parse_key("fault.path_whitelist")
        .try_parsing(true)
}
