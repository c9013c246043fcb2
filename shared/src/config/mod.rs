//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Session token (JWT) configuration
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Passcode policy (length, TTL, attempts, resend cooldown)
//! - `server` - HTTP server configuration
//! - `sms` - Delivery provider selection and credentials
//! - `store` - OTP record store backend selection

pub mod auth;
pub mod environment;
pub mod otp;
pub mod server;
pub mod sms;
pub mod store;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::JwtConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpPolicyConfig;
pub use server::ServerConfig;
pub use sms::{Msg91Settings, SmsConfig, SmsProviderKind, TwilioSettings};
pub use store::{StoreBackend, StoreConfig};

/// Configuration errors detected at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Passcode policy
    pub otp: OtpPolicyConfig,

    /// Delivery provider configuration
    pub sms: SmsConfig,

    /// Record store configuration
    pub store: StoreConfig,

    /// Session token configuration
    pub jwt: JwtConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            otp: OtpPolicyConfig::default(),
            sms: SmsConfig::default(),
            store: StoreConfig::default(),
            jwt: JwtConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            otp: OtpPolicyConfig::from_env(environment),
            sms: SmsConfig::from_env(),
            store: StoreConfig::from_env(),
            jwt: JwtConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Validate cross-cutting settings before the server starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.otp.validate()?;
        self.store.validate()?;
        if self.environment.is_production() && self.jwt.is_using_default_secret() {
            return Err(ConfigError::InvalidValue {
                key: "JWT_SECRET".to_string(),
                message: "the default secret cannot be used in production".to_string(),
            });
        }
        Ok(())
    }
}

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is unset or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read an optional, non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
