//! Shared utilities and common types for the phone verification server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures
//! - Phone number utilities (normalization, validation, masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, Environment, JwtConfig, LogFormat, LoggingConfig, Msg91Settings,
    OtpPolicyConfig, ServerConfig, SmsConfig, SmsProviderKind, StoreBackend, StoreConfig,
    TwilioSettings,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::phone;
