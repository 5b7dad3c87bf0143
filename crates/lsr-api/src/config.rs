use std::{num::NonZeroU64, time::Duration};

use serde::Deserialize;

/// Deployment environment, drives log formatting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Service configuration, read from environment variables.
///
/// | Variable | Default |
/// |---|---|
/// | `DATABASE_URL` | unset: in-memory store |
/// | `HOST` | `0.0.0.0` |
/// | `PORT` | `3000` |
/// | `ENV` | `development` |
/// | `ALLOWED_ORIGINS` | unset: any origin |
/// | `DB_MAX_CONNECTIONS` | `10` |
/// | `DUE_CHECK_INTERVAL_SECS` | `3600`, must be non-zero |
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub env: Environment,
    /// Comma separated, e.g. `chrome-extension://abcdef`
    #[serde(default)]
    pub allowed_origins: Option<String>,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_due_check_interval_secs")]
    pub due_check_interval_secs: NonZeroU64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_db_max_connections() -> u32 {
    10
}

fn default_due_check_interval_secs() -> NonZeroU64 {
    NonZeroU64::new(3600).unwrap_or(NonZeroU64::MIN)
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Build from explicit key/value pairs instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Allowed CORS origins; empty means any origin.
    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub const fn due_check_interval(&self) -> Duration {
        Duration::from_secs(self.due_check_interval_secs.get())
    }
}
