//! Errors raised at the delivery and storage seams
//!
//! Provider- and backend-specific failures are wrapped into these shapes at
//! the adapter boundary, so the services never see vendor error types.

use thiserror::Error;

/// Failure reported by an SMS delivery provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Required credentials are missing for the selected provider. Not retried.
    #[error("{provider} is not configured: {message}")]
    Configuration { provider: String, message: String },

    /// The vendor rejected the request, the transport failed or timed out
    #[error("{provider} delivery failed: {payload}")]
    Delivery {
        provider: String,
        status: Option<u16>,
        payload: String,
    },
}

impl DeliveryError {
    pub fn configuration(provider: &str, message: impl Into<String>) -> Self {
        DeliveryError::Configuration {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn delivery(provider: &str, status: Option<u16>, payload: impl Into<String>) -> Self {
        DeliveryError::Delivery {
            provider: provider.to_string(),
            status,
            payload: payload.into(),
        }
    }

    /// Only vendor-side failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::Delivery { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            DeliveryError::Configuration { provider, .. } => provider,
            DeliveryError::Delivery { provider, .. } => provider,
        }
    }
}

/// Failure of the OTP record store. Callers must fail closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store backend error: {message}")]
    Backend { message: String },

    #[error("Stored record is corrupt: {message}")]
    Corrupt { message: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        StoreError::Corrupt {
            message: message.into(),
        }
    }
}
