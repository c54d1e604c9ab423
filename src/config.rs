//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Raw `PORT` value; unset or empty means [`DEFAULT_PORT`].
    #[serde(default)]
    pub port: Option<String>,

    /// Deployment environment name reported by `/api`.
    #[serde(default = "default_node_env")]
    pub node_env: String,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

/// Listener port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8080;

fn default_node_env() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: None,
            node_env: default_node_env(),
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// `PORT` as given, when set to something non-empty.
    pub fn port_env(&self) -> Option<&str> {
        self.port.as_deref().filter(|raw| !raw.is_empty())
    }

    /// Port to listen on; 0 when `PORT` is not a valid port number.
    pub fn listen_port(&self) -> u16 {
        match self.port_env() {
            Some(raw) => raw.trim().parse().unwrap_or(0),
            None => DEFAULT_PORT,
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port() == 0 {
            return Err("PORT must be between 1 and 65535".to_string());
        }

        if self.node_env.trim().is_empty() {
            return Err("NODE_ENV must not be blank".to_string());
        }

        Ok(())
    }

    /// Check if running with the production profile.
    pub fn is_production(&self) -> bool {
        self.node_env.eq_ignore_ascii_case("production")
    }
}
