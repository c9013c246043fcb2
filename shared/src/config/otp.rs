//! Passcode policy configuration

use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError, Environment};

/// Shortest passcode the policy accepts
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest passcode the policy accepts
pub const MAX_CODE_LENGTH: usize = 6;

/// Policy values shared by the issuance and verification services
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpPolicyConfig {
    /// Number of decimal digits in a passcode (4..=6)
    pub code_length: usize,

    /// Seconds a passcode stays valid after issuance
    pub ttl_seconds: u64,

    /// Failed verifications allowed before the record locks
    pub max_attempts: u32,

    /// Minimum seconds between two issuances for the same phone (0 disables)
    pub resend_cooldown_seconds: u64,

    /// bcrypt cost used to hash passcodes at rest
    pub hash_cost: u32,

    /// Return the plaintext passcode in issuance responses (never in production)
    pub expose_dev_code: bool,

    /// Country code prefixed to national numbers during normalization
    pub default_country_code: String,
}

impl Default for OtpPolicyConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            ttl_seconds: 300,
            max_attempts: 5,
            resend_cooldown_seconds: 60,
            hash_cost: 8,
            expose_dev_code: false,
            default_country_code: String::from("+91"),
        }
    }
}

impl OtpPolicyConfig {
    /// Load from `OTP_*` environment variables
    pub fn from_env(env: Environment) -> Self {
        let defaults = Self::default();
        // never honoured in production
        let expose_dev_code =
            env_or("OTP_EXPOSE_DEV_CODE", defaults.expose_dev_code) && !env.is_production();

        Self {
            code_length: env_or("OTP_CODE_LENGTH", defaults.code_length),
            ttl_seconds: env_or("OTP_TTL_SECONDS", defaults.ttl_seconds),
            max_attempts: env_or("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            resend_cooldown_seconds: env_or(
                "OTP_RESEND_COOLDOWN_SECONDS",
                defaults.resend_cooldown_seconds,
            ),
            hash_cost: env_or("OTP_HASH_COST", defaults.hash_cost),
            expose_dev_code,
            default_country_code: env_or(
                "OTP_DEFAULT_COUNTRY_CODE",
                defaults.default_country_code,
            ),
        }
    }

    /// TTL in whole minutes, as quoted in the SMS text. `validate` only
    /// accepts whole-minute TTLs, so this is exact for a valid policy.
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl_seconds / 60
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(ConfigError::InvalidValue {
                key: "OTP_CODE_LENGTH".to_string(),
                message: format!(
                    "must be between {} and {}, got {}",
                    MIN_CODE_LENGTH, MAX_CODE_LENGTH, self.code_length
                ),
            });
        }
        if self.ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "OTP_TTL_SECONDS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        // the SMS text quotes the TTL in minutes
        if self.ttl_seconds % 60 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "OTP_TTL_SECONDS".to_string(),
                message: format!("must be a whole number of minutes, got {}s", self.ttl_seconds),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "OTP_MAX_ATTEMPTS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        // bcrypt accepts costs 4..=31
        if !(4..=31).contains(&self.hash_cost) {
            return Err(ConfigError::InvalidValue {
                key: "OTP_HASH_COST".to_string(),
                message: format!("must be between 4 and 31, got {}", self.hash_cost),
            });
        }
        if !crate::phone::is_valid_country_code(&self.default_country_code) {
            return Err(ConfigError::InvalidValue {
                key: "OTP_DEFAULT_COUNTRY_CODE".to_string(),
                message: format!("not a country calling code: {}", self.default_country_code),
            });
        }
        Ok(())
    }
}
