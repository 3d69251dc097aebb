//! Configuration module for loading the service settings from YAML
//!
//! Every section is optional and defaulted. Environment variables are applied
//! on top of the file, so a container can run without any config file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::core::auth::AuthPolicies;
use crate::core::pricing::PriceTable;
use crate::orders::TransitionPolicy;

/// Default config file looked up when `CAKESHOP_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/cakeshop.yaml";

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub pricing: PriceTable,
    pub lifecycle: LifecycleConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            request_timeout_secs: 30,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub uri: String,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            uri: "mongodb://localhost:27017".to_string(),
            database: "cakeShopDB".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 secret; without it every bearer token is rejected
    pub jwt_secret: Option<String>,

    /// Operation name -> `public` | `authenticated` | `admin_only`
    pub policies: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub transition_policy: TransitionPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// `log` or `resend`
    pub provider: String,
    pub timeout_ms: u64,
    pub from: String,
    pub reply_to: Option<String>,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub shop_name: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            provider: "log".to_string(),
            timeout_ms: 10_000,
            from: "Cube Cake <onboarding@resend.dev>".to_string(),
            reply_to: None,
            api_key: None,
            api_url: None,
            shop_name: "Cube Cake".to_string(),
        }
    }
}

impl NotificationsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would otherwise be silently ignored
    pub fn validate(&self) -> Result<()> {
        AuthPolicies::from_config(&self.auth.policies).context("invalid auth.policies")?;
        Ok(())
    }

    /// File (if any) plus process environment
    ///
    /// `CAKESHOP_CONFIG` names the file; otherwise [`DEFAULT_CONFIG_PATH`] is
    /// used when it exists.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("CAKESHOP_CONFIG") {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_yaml_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment-style overrides from a lookup function
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number (got '{}')", port))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(uri) = lookup("MONGODB_URI") {
            self.storage.uri = uri;
            self.storage.backend = StorageBackend::Mongodb;
        }
        if let Some(database) = lookup("MONGODB_DATABASE") {
            self.storage.database = database;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(key) = lookup("RESEND_API_KEY") {
            self.notifications.api_key = Some(key);
            self.notifications.provider = "resend".to_string();
        }
        Ok(())
    }
}
