//! OTP record store configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or, ConfigError};

/// Backend holding outstanding passcode records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map, lost on restart
    #[default]
    Memory,
    Redis,
    Mysql,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            "mysql" => Ok(StoreBackend::Mysql),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Redis => write!(f, "redis"),
            StoreBackend::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Redis connection URL, required for the redis backend
    #[serde(default)]
    pub redis_url: Option<String>,

    /// MySQL connection URL, required for the mysql backend
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum pooled MySQL connections
    pub max_connections: u32,

    /// Seconds between expired-record sweeps (0 disables the sweeper)
    pub sweep_interval_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: None,
            database_url: None,
            max_connections: 10,
            sweep_interval_seconds: 60,
        }
    }
}

impl StoreConfig {
    /// Load from `OTP_STORE`, `REDIS_URL`, `DATABASE_URL`,
    /// `DATABASE_MAX_CONNECTIONS` and `OTP_SWEEP_INTERVAL_SECONDS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env_or("OTP_STORE", defaults.backend),
            redis_url: env_opt("REDIS_URL"),
            database_url: env_opt("DATABASE_URL"),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            sweep_interval_seconds: env_or(
                "OTP_SWEEP_INTERVAL_SECONDS",
                defaults.sweep_interval_seconds,
            ),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StoreBackend::Redis if self.redis_url.is_none() => Err(ConfigError::InvalidValue {
                key: "REDIS_URL".to_string(),
                message: "required when OTP_STORE=redis".to_string(),
            }),
            StoreBackend::Mysql if self.database_url.is_none() => {
                Err(ConfigError::InvalidValue {
                    key: "DATABASE_URL".to_string(),
                    message: "required when OTP_STORE=mysql".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
