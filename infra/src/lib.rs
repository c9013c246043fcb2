//! # Infrastructure Layer
//!
//! Concrete implementations of the seams defined in `otp_core`:
//!
//! - **SMS**: Twilio, MSG91 and a mock provider behind [`sms::SmsProvider`]
//! - **Store**: in-memory, Redis and MySQL OTP record stores behind
//!   [`store::OtpStoreBackend`], plus the expired-record sweeper
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL record store (default)
//! - `redis-store`: Enable the Redis record store (default)

pub use otp_core::errors::*;

/// SMS delivery providers
pub mod sms;

/// OTP record stores
pub mod store;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis error
    #[cfg(feature = "redis-store")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Record (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Serialization(e) => StoreError::corrupt(e.to_string()),
            other => StoreError::backend(other.to_string()),
        }
    }
}
