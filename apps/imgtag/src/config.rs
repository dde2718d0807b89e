//! # Configuration
//!
//! Layered settings for the server and the CLI.
//!
//! Precedence, lowest first:
//! 1. Built-in defaults
//! 2. TOML file given with `--config`
//! 3. Environment variables (`IMGTAG_*`)
//! 4. Command-line flags
//!
//! ## Environment Variables
//!
//! - `IMGTAG_HOST`, `IMGTAG_PORT`: listen address
//! - `IMGTAG_DATABASE`: path to the redb catalog
//! - `IMGTAG_BACKEND`: `redb` or `memory`
//! - `IMGTAG_TAG_MATCH`: `case-insensitive` or `exact`
//! - `IMGTAG_CORS_ORIGINS`: comma-separated origins, or `*` for all
//! - `IMGTAG_RATE_LIMIT`: requests per second, `0` disables

use crate::error::AppError;
use imgtag_core::TagMatch;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Which catalog backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Disk-backed redb catalog.
    #[default]
    Redb,
    /// Volatile in-memory catalog.
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(AppError::Config(format!("unknown backend '{}'", other))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redb => write!(f, "redb"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Path to the catalog database.
    pub database: PathBuf,
    /// Storage backend.
    pub backend: BackendKind,
    /// Tag matching mode.
    pub tag_match: TagMatch,
    /// Allowed CORS origins (comma-separated, `*` for all). `None` means localhost only.
    pub cors_origins: Option<String>,
    /// Requests per second, `0` disables rate limiting.
    pub rate_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("imgtag.redb"),
            backend: BackendKind::Redb,
            tag_match: TagMatch::CaseInsensitive,
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl AppConfig {
    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Apply `IMGTAG_*` overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("IMGTAG_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("IMGTAG_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("invalid IMGTAG_PORT '{}'", port)))?;
        }
        if let Some(database) = lookup("IMGTAG_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(backend) = lookup("IMGTAG_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(mode) = lookup("IMGTAG_TAG_MATCH") {
            self.tag_match = mode.parse().map_err(|e| AppError::Config(format!("{}", e)))?;
        }
        if let Some(origins) = lookup("IMGTAG_CORS_ORIGINS") {
            self.cors_origins = Some(origins);
        }
        if let Some(rate) = lookup("IMGTAG_RATE_LIMIT") {
            self.rate_limit = rate
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("invalid IMGTAG_RATE_LIMIT '{}'", rate)))?;
        }
        Ok(self)
    }

    /// `host:port` listen address.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.backend, BackendKind::Redb);
        assert_eq!(config.tag_match, TagMatch::CaseInsensitive);
        assert_eq!(config.rate_limit, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            port = 9000
            tag_match = "exact"
            cors_origins = "*"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.tag_match, TagMatch::Exact);
        assert_eq!(config.cors_origins.as_deref(), Some("*"));
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(AppConfig::from_toml_str("colour = \"blue\"").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let config = AppConfig::from_toml_str("port = 9000\nbackend = \"memory\"")
            .unwrap()
            .with_env(env(&[("IMGTAG_PORT", "7070"), ("IMGTAG_RATE_LIMIT", "0")]))
            .unwrap();
        assert_eq!(config.port, 7070);
        assert_eq!(config.rate_limit, 0);
        assert_eq!(config.backend, BackendKind::Memory);
    }

    #[test]
    fn bad_env_values_are_config_errors() {
        let result = AppConfig::default().with_env(env(&[("IMGTAG_PORT", "eighty")]));
        assert!(matches!(result, Err(AppError::Config(_))));

        let result = AppConfig::default().with_env(env(&[("IMGTAG_BACKEND", "mongo")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn backend_kind_parses() {
        assert_eq!("REDB".parse::<BackendKind>().unwrap(), BackendKind::Redb);
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!(BackendKind::Memory.to_string(), "memory");
    }
}
