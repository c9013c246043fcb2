//! SMS Delivery Module
//!
//! Interchangeable passcode delivery providers behind the core
//! `SmsServiceTrait` seam. The provider is chosen once from [`SmsConfig`]
//! and dispatched through the [`SmsProvider`] enum.
//!
//! - **Twilio**: form-encoded Messages API with basic auth
//! - **MSG91**: JSON OTP API keyed by a template id
//! - **Mock**: no network, logs the code for local development
//!
//! Every real provider uses an HTTP client with a bounded timeout and wraps
//! vendor failures into [`DeliveryError`] before they leave this module.

use std::time::Duration;

use async_trait::async_trait;
use otp_core::services::{DeliveryReceipt, SmsServiceTrait};
use otp_shared::{SmsConfig, SmsProviderKind};
use reqwest::Client;
use tracing::{info, warn};

use crate::{DeliveryError, InfrastructureError};

pub mod mock_sms;
pub mod msg91;
pub mod twilio;

pub use mock_sms::MockSmsService;
pub use msg91::{Msg91Request, Msg91SmsService};
pub use twilio::{TwilioRequest, TwilioSmsService};

#[cfg(test)]
mod tests;

/// Text delivered to the phone. The validity window is derived from the
/// configured TTL so the message and the stored expiry cannot drift apart.
pub fn otp_message(code: &str, ttl_minutes: u64) -> String {
    format!(
        "Your OTP is {}. It is valid for {} minutes.",
        code, ttl_minutes
    )
}

/// Build an HTTP client whose requests are bounded by `timeout_secs`
pub(crate) fn http_client(timeout_secs: u64) -> Result<Client, InfrastructureError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Map a transport failure to a delivery error
pub(crate) fn transport_error(provider: &str, err: reqwest::Error, timeout_secs: u64) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::delivery(
            provider,
            None,
            format!("request timed out after {}s", timeout_secs),
        )
    } else {
        DeliveryError::delivery(provider, err.status().map(|s| s.as_u16()), err.to_string())
    }
}

/// Treat unset and blank settings alike
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The configured delivery provider
pub enum SmsProvider {
    Twilio(TwilioSmsService),
    Msg91(Msg91SmsService),
    Mock(MockSmsService),
}

impl SmsProvider {
    /// Select and build the provider named by `config.provider`.
    ///
    /// Credentials are not checked here: a real provider with missing
    /// credentials reports a configuration error on each send.
    pub fn from_config(config: &SmsConfig, ttl_minutes: u64) -> Result<Self, InfrastructureError> {
        let provider = match config.provider {
            SmsProviderKind::Twilio => SmsProvider::Twilio(TwilioSmsService::new(
                config.twilio.clone(),
                config.request_timeout_secs,
                ttl_minutes,
            )?),
            SmsProviderKind::Msg91 => SmsProvider::Msg91(Msg91SmsService::new(
                config.msg91.clone(),
                config.request_timeout_secs,
                ttl_minutes,
            )?),
            SmsProviderKind::Mock => {
                warn!(
                    target: "sms_service",
                    provider = "mock",
                    "No real SMS provider configured, passcodes will only be logged"
                );
                SmsProvider::Mock(MockSmsService::new(ttl_minutes))
            }
        };

        info!(
            target: "sms_service",
            provider = provider.provider_name(),
            timeout_secs = config.request_timeout_secs,
            "SMS provider initialized"
        );
        Ok(provider)
    }

    /// The mock provider, when selected
    pub fn as_mock(&self) -> Option<&MockSmsService> {
        match self {
            SmsProvider::Mock(mock) => Some(mock),
            _ => None,
        }
    }
}

#[async_trait]
impl SmsServiceTrait for SmsProvider {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<DeliveryReceipt, DeliveryError> {
        match self {
            SmsProvider::Twilio(service) => service.send_otp(phone, code).await,
            SmsProvider::Msg91(service) => service.send_otp(phone, code).await,
            SmsProvider::Mock(service) => service.send_otp(phone, code).await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            SmsProvider::Twilio(service) => service.provider_name(),
            SmsProvider::Msg91(service) => service.provider_name(),
            SmsProvider::Mock(service) => service.provider_name(),
        }
    }
}
