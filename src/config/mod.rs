//! Configuration module for the showroom backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::listview::DEFAULT_PAGE_SIZE;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding mutating routes (reads stay public)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory holding uploaded files
    pub upload_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Page size for resources without their own
    pub page_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_psk = lookup("SHOWROOM_API_PSK").filter(|psk| !psk.trim().is_empty());

        let db_path = lookup("SHOWROOM_DB_PATH")
            .unwrap_or_else(|| "./data/showroom.sqlite".to_string())
            .into();

        let upload_dir = lookup("SHOWROOM_UPLOAD_DIR")
            .unwrap_or_else(|| "./data/uploads".to_string())
            .into();

        let bind_addr = lookup("SHOWROOM_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr.parse().map_err(|_| {
            AppError::Config(format!("Invalid SHOWROOM_BIND_ADDR '{}'", bind_addr))
        })?;

        let log_level = lookup("SHOWROOM_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let page_size = match lookup("SHOWROOM_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(AppError::Config(format!(
                        "Invalid SHOWROOM_PAGE_SIZE '{}'",
                        raw
                    )))
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            api_psk,
            db_path,
            upload_dir,
            bind_addr,
            log_level,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/showroom.sqlite"));
        assert_eq!(config.upload_dir, PathBuf::from("./data/uploads"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SHOWROOM_API_PSK", "secret"),
            ("SHOWROOM_BIND_ADDR", "0.0.0.0:9000"),
            ("SHOWROOM_PAGE_SIZE", "25"),
        ])
        .unwrap();

        assert_eq!(config.api_psk.as_deref(), Some("secret"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_blank_psk_disables_auth() {
        let config = config_from(&[("SHOWROOM_API_PSK", "  ")]).unwrap();
        assert!(config.api_psk.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = config_from(&[("SHOWROOM_BIND_ADDR", "not-an-addr")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = config_from(&[("SHOWROOM_PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
