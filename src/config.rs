//! Service configuration.
//!
//! Loaded from `~/.bookpro/config.toml` (or a `--config` path), with
//! `BOOKPRO_*` environment variables taking precedence over the file.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Data store seeding
    #[serde(default)]
    pub store: StoreConfig,

    /// Sessions and the seeded admin account
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allowed CORS origin. Absent means permissive (any origin).
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_port() -> u16 {
    3001
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            cors_origin: None,
        }
    }
}

/// Data store seeding settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Seed the built-in fixtures at startup
    #[serde(default = "default_true")]
    pub seed_fixtures: bool,

    /// Optional JSON fixture file (supports ~ expansion); overrides the
    /// built-in fixtures when set
    #[serde(default)]
    pub fixtures_file: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_fixtures: true,
            fixtures_file: None,
        }
    }
}

/// Sessions and the seeded admin account
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Password-reset token lifetime in seconds
    #[serde(default = "default_reset_ttl")]
    pub reset_ttl_secs: u64,

    /// How often expired sessions are swept
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Seeded admin account email
    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    /// Seeded admin account display name
    #[serde(default = "default_admin_name")]
    pub admin_name: String,

    /// Seeded admin account password. Set via config file or
    /// BOOKPRO_ADMIN_PASSWORD; absent means no admin is seeded.
    #[serde(default)]
    pub admin_password: Option<SecretString>,
}

fn default_session_ttl() -> u64 {
    86_400 // 24 hours
}

fn default_reset_ttl() -> u64 {
    900 // 15 minutes
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_admin_email() -> String {
    "admin@bookpro.local".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            reset_ttl_secs: default_reset_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            admin_email: default_admin_email(),
            admin_name: default_admin_name(),
            admin_password: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when no
    /// config file exists.
    pub fn load() -> Result<Config> {
        match default_config_path() {
            Some(path) if path.exists() => Config::load_from(&path),
            _ => Ok(Config::default().with_env_overrides()),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    /// Apply BOOKPRO_* environment overrides on top of file values.
    pub fn with_env_overrides(mut self) -> Config {
        if let Ok(port) = std::env::var("BOOKPRO_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(bind) = std::env::var("BOOKPRO_BIND") {
            self.server.bind = bind;
        }
        if let Ok(origin) = std::env::var("BOOKPRO_CORS_ORIGIN") {
            self.server.cors_origin = Some(origin);
        }
        if let Ok(path) = std::env::var("BOOKPRO_FIXTURES_FILE") {
            self.store.fixtures_file = Some(path);
        }
        if let Ok(password) = std::env::var("BOOKPRO_ADMIN_PASSWORD") {
            self.auth.admin_password = Some(SecretString::from(password));
        }
        self
    }

    /// Expand ~ in the fixtures file path.
    pub fn resolve_fixtures_file(&self) -> Option<PathBuf> {
        self.store.fixtures_file.as_ref().map(|p| expand_home(p))
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bookpro").join("config.toml"))
}
