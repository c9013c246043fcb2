//! Session token configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// JWT session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Session token lifetime in days
    pub expiry_days: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            expiry_days: 7,
            issuer: String::from("phone-verify"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set token expiry in days
    pub fn with_expiry_days(mut self, days: i64) -> Self {
        self.expiry_days = days;
        self
    }

    /// Load from `JWT_SECRET`, `JWT_EXPIRY_DAYS` and `JWT_ISSUER`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env_opt("JWT_SECRET").unwrap_or(defaults.secret),
            expiry_days: env_or("JWT_EXPIRY_DAYS", defaults.expiry_days),
            issuer: env_opt("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }

    /// Token lifetime in seconds
    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_days * 86_400
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.expiry_days, 7);
        assert_eq!(config.expiry_seconds(), 604_800);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret").with_expiry_days(14);

        assert_eq!(config.expiry_seconds(), 1_209_600);
        assert!(!config.is_using_default_secret());
    }
}
