//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Leaguepedia API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaguepediaConfig {
    /// MediaWiki API endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum gap between API requests
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Max rows per cargo query page (the API caps this at 500)
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Total row cap per import, to stay under Fandom's rate limits
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Bot credentials for cargo queries. The LEAGUEPEDIA_BOT_USERNAME and
    /// LEAGUEPEDIA_BOT_PASSWORD environment variables take precedence.
    #[serde(default)]
    pub bot_username: Option<String>,

    #[serde(default)]
    pub bot_password: Option<String>,
}

fn default_base_url() -> String {
    "https://lol.fandom.com/api.php".to_string()
}

fn default_user_agent() -> String {
    "roster-tracker/0.1 (educational project)".to_string()
}

fn default_request_delay() -> u64 {
    500
}

fn default_max_limit() -> u32 {
    500
}

fn default_max_retries() -> u32 {
    5
}

fn default_max_results() -> u32 {
    2500
}

impl Default for LeaguepediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_delay_ms: default_request_delay(),
            max_limit: default_max_limit(),
            max_retries: default_max_retries(),
            max_results: default_max_results(),
            bot_username: None,
            bot_password: None,
        }
    }
}

impl LeaguepediaConfig {
    /// Let environment variables override file-based credentials.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(username) = std::env::var("LEAGUEPEDIA_BOT_USERNAME") {
            if !username.is_empty() {
                self.bot_username = Some(username);
            }
        }
        if let Ok(password) = std::env::var("LEAGUEPEDIA_BOT_PASSWORD") {
            if !password.is_empty() {
                self.bot_password = Some(password);
            }
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./roster.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Default import filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDefaults {
    #[serde(default = "default_tournament")]
    pub tournament: String,

    #[serde(default = "default_year")]
    pub year: String,
}

fn default_tournament() -> String {
    "LCK".to_string()
}

fn default_year() -> String {
    "2025".to_string()
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            tournament: default_tournament(),
            year: default_year(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub leaguepedia: LeaguepediaConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub import: ImportDefaults,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist. Environment overrides are applied last.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.leaguepedia.apply_env_overrides();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.leaguepedia.max_limit, 500);
        assert_eq!(config.leaguepedia.max_results, 2500);
        assert_eq!(config.import.tournament, "LCK");
        assert!(config.leaguepedia.bot_username.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [leaguepedia]
            request_delay_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.leaguepedia.request_delay_ms, 100);
        assert_eq!(config.leaguepedia.max_retries, 5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.database.path, PathBuf::from("./roster.db"));
    }

    #[test]
    fn test_load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[import]\ntournament = \"LEC\"\nyear = \"2024\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.import.tournament, "LEC");
        assert_eq!(config.import.year, "2024");
    }
}
