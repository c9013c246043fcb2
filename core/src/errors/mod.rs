//! Domain-specific error types and error handling.

mod types;

pub use types::{DeliveryError, StoreError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Please wait {retry_after_seconds} seconds before requesting a new code")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Delivery failed via {provider}: {message}")]
    Delivery { provider: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Session token error: {message}")]
    Token { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<DeliveryError> for DomainError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Configuration { provider, message } => DomainError::Configuration {
                message: format!("{}: {}", provider, message),
            },
            DeliveryError::Delivery { provider, status, payload } => {
                let message = match status {
                    Some(status) => format!("status {}: {}", status, payload),
                    None => payload,
                };
                DomainError::Delivery { provider, message }
            }
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
