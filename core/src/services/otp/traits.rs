//! Delivery seam implemented by the SMS providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::DeliveryError;

/// Provider acknowledgement of a sent message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub provider: String,
    /// Vendor message identifier, when the vendor returns one
    pub message_id: Option<String>,
}

/// Trait for SMS service integration
#[async_trait]
pub trait SmsServiceTrait: Send + Sync {
    /// Send a message carrying `code` to `phone` (canonical E.164)
    async fn send_otp(&self, phone: &str, code: &str) -> Result<DeliveryReceipt, DeliveryError>;

    /// Stable provider name used in logs and errors
    fn provider_name(&self) -> &'static str;
}
