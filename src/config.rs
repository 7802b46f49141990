//! Configuration management for the pixelbin server
//!
//! Network defaults come from `config.toml`; secrets and paths are supplied
//! through `PIXELBIN_`-prefixed environment variables and are required at
//! startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Complete server configuration, loaded once during startup.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// IP address to bind the HTTP listener
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the HTTP listener (0 picks an ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted upload body size in MB
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,

    /// Secret key used to sign session cookies (min 32 bytes)
    /// Environment: PIXELBIN_SESSION_SECRET
    pub session_secret: String,

    /// Database connection string (a SQLite path, or ":memory:")
    /// Environment: PIXELBIN_DATABASE_URL
    pub database_url: String,

    /// Root directory for uploaded files
    /// Environment: PIXELBIN_UPLOAD_ROOT
    pub upload_root: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_mb() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from config.toml (optional) with environment
    /// overrides. Missing required values surface as a `ConfigError`.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("PIXELBIN"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session_secret.len() < 32 {
            return Err(ConfigError::Message(
                "session_secret must be at least 32 bytes".into(),
            ));
        }

        if self.database_url.is_empty() {
            return Err(ConfigError::Message("database_url cannot be empty".into()));
        }

        if self.upload_root.is_empty() {
            return Err(ConfigError::Message("upload_root cannot be empty".into()));
        }

        if self.max_upload_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get upload root as PathBuf
    pub fn upload_root_path(&self) -> PathBuf {
        PathBuf::from(&self.upload_root)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            bind_address: default_bind_address(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
            session_secret: "0123456789abcdef0123456789abcdef".to_string(),
            database_url: ":memory:".to_string(),
            upload_root: "/tmp/pixelbin".to_string(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = base_config();
        config.session_secret = "too-short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_database_url_rejected() {
        let mut config = base_config();
        config.database_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_upload_root_rejected() {
        let mut config = base_config();
        config.upload_root = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addr_format() {
        let config = base_config();
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    }
}
