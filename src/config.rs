use std::env;
use std::fs;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Account;
use crate::error::{ApiError, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub token_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

/// Accounts are provisioned from configuration; credential management is
/// handled outside this service.
#[derive(Debug, Deserialize)]
pub struct AccountConfig {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_port() -> u16 {
    5000
}

fn default_token_ttl() -> i64 {
    720
}

fn default_window_secs() -> u64 {
    900
}

fn default_max_requests() -> u32 {
    100
}

fn default_active() -> bool {
    true
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("Failed to read config file '{path}': {e}"))
        })?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ApiError::Config(format!("Failed to parse '{path}': {e}")))?;

        // Environment wins over the file for deploy-time settings.
        if let Some(port) = env::var("PORT").ok().and_then(|raw| raw.parse().ok()) {
            config.server.port = port;
        }
        if let Ok(secret) = env::var("REFNET_TOKEN_SECRET") {
            config.auth.token_secret = secret;
        }

        Ok(config)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.auth
            .accounts
            .iter()
            .map(|account| Account {
                id: account.id,
                name: account.name.clone(),
                active: account.active,
                locked: account.locked,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let raw = r#"
            [server]
            port = 8080

            [auth]
            token_secret = "s3cret"
            token_ttl_minutes = 60

            [auth.rate_limit]
            window_secs = 60
            max_requests = 5

            [[auth.accounts]]
            id = "7f1f3a30-55c3-4f56-a6a2-70ff87d47d1a"
            name = "Field Ops"

            [[auth.accounts]]
            id = "1f4a9b02-8f0f-41f6-b7ce-1ab92e3c1e52"
            name = "Dormant"
            active = false
            locked = true
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.rate_limit.max_requests, 5);
        let accounts = config.accounts();
        assert_eq!(accounts.len(), 2);
        assert!(accounts[0].active);
        assert!(accounts[1].locked);
    }

    #[test]
    fn load_reads_a_file_and_fails_on_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refnet.toml");
        std::fs::write(&path, "[auth]\ntoken_secret = \"abc\"\n").unwrap();
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 5000);

        let missing = dir.path().join("absent.toml");
        assert!(Config::load(missing.to_str().unwrap()).is_err());
    }

    #[test]
    fn defaults_fill_in_optional_sections() {
        let raw = r#"
            [auth]
            token_secret = "s3cret"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_ttl_minutes, 720);
        assert_eq!(config.auth.rate_limit.window_secs, 900);
        assert!(config.accounts().is_empty());
    }
}
