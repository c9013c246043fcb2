//! MSG91 SMS Service Implementation
//!
//! Sends passcodes through the MSG91 OTP API, which renders the message from
//! a pre-approved template. MSG91 expects the mobile number without the
//! leading `+` and may answer HTTP 200 with an error document.

use async_trait::async_trait;
use otp_core::services::{DeliveryReceipt, SmsServiceTrait};
use otp_shared::phone::mask_phone_number;
use otp_shared::Msg91Settings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{http_client, non_empty, transport_error};
use crate::{DeliveryError, InfrastructureError};

const PROVIDER: &str = "msg91";

/// JSON body of an MSG91 OTP request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Msg91Request {
    pub template_id: String,
    /// Country code and number, no `+`
    pub mobile: String,
    pub otp: String,
    /// Validity in minutes, rendered by the template
    pub otp_expiry: u64,
}

impl Msg91Request {
    pub fn new(
        phone: &str,
        code: &str,
        settings: &Msg91Settings,
        ttl_minutes: u64,
    ) -> Result<Self, DeliveryError> {
        let template_id = non_empty(&settings.template_id)
            .ok_or_else(|| DeliveryError::configuration(PROVIDER, "MSG91_TEMPLATE_ID is not set"))?;

        let mobile = phone.trim_start_matches('+');
        if mobile.is_empty() || !mobile.chars().all(|c| c.is_ascii_digit()) {
            return Err(DeliveryError::delivery(
                PROVIDER,
                None,
                "mobile number must contain digits only",
            ));
        }

        Ok(Self {
            template_id: template_id.to_string(),
            mobile: mobile.to_string(),
            otp: code.to_string(),
            otp_expiry: ttl_minutes,
        })
    }
}

/// MSG91 answers `{"type": "success" | "error", ...}`
#[derive(Debug, Deserialize)]
struct Msg91Response {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

/// MSG91 SMS service implementation
pub struct Msg91SmsService {
    client: Client,
    settings: Msg91Settings,
    timeout_secs: u64,
    ttl_minutes: u64,
}

impl Msg91SmsService {
    pub fn new(
        settings: Msg91Settings,
        timeout_secs: u64,
        ttl_minutes: u64,
    ) -> Result<Self, InfrastructureError> {
        let client = http_client(timeout_secs)?;
        info!(target: "sms_service", provider = PROVIDER, "MSG91 SMS service initialized");
        Ok(Self {
            client,
            settings,
            timeout_secs,
            ttl_minutes,
        })
    }

    fn otp_url(&self) -> String {
        format!("{}/api/v5/otp", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SmsServiceTrait for Msg91SmsService {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<DeliveryReceipt, DeliveryError> {
        let auth_key = non_empty(&self.settings.auth_key)
            .ok_or_else(|| DeliveryError::configuration(PROVIDER, "MSG91_AUTH_KEY is not set"))?;
        let request = Msg91Request::new(phone, code, &self.settings, self.ttl_minutes)?;
        let masked = mask_phone_number(phone);

        debug!(target: "sms_service", provider = PROVIDER, phone = %masked, "Sending SMS");

        let response = self
            .client
            .post(self.otp_url())
            .header("authkey", auth_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(target: "sms_service", provider = PROVIDER, phone = %masked, error = %e, "MSG91 request failed");
                transport_error(PROVIDER, e, self.timeout_secs)
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<Msg91Response>(&body).ok();

        let rejection = match &parsed {
            _ if !status.is_success() => Some(
                parsed
                    .as_ref()
                    .and_then(|r| r.message.clone())
                    .unwrap_or_else(|| body.clone()),
            ),
            Some(r) if r.kind.eq_ignore_ascii_case("error") => {
                Some(r.message.clone().unwrap_or_else(|| body.clone()))
            }
            Some(_) => None,
            None => Some(format!("unreadable response: {}", body)),
        };

        if let Some(payload) = rejection {
            warn!(
                target: "sms_service",
                provider = PROVIDER,
                phone = %masked,
                status = status.as_u16(),
                payload = %payload,
                "MSG91 rejected the message"
            );
            return Err(DeliveryError::delivery(PROVIDER, Some(status.as_u16()), payload));
        }

        let message_id = parsed.and_then(|r| r.request_id);
        info!(
            target: "sms_service",
            provider = PROVIDER,
            phone = %masked,
            message_id = ?message_id,
            "SMS sent"
        );

        Ok(DeliveryReceipt {
            provider: PROVIDER.to_string(),
            message_id,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
