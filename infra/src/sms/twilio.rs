//! Twilio SMS Service Implementation
//!
//! Sends passcodes through the Twilio Messages API: a form-encoded POST to
//! `/2010-04-01/Accounts/{AccountSid}/Messages.json` authenticated with the
//! account SID and auth token as basic-auth credentials.
//!
//! The request is built and validated before any network call, so missing
//! credentials surface as a configuration error and never reach Twilio.

use async_trait::async_trait;
use otp_core::services::{DeliveryReceipt, SmsServiceTrait};
use otp_shared::phone::mask_phone_number;
use otp_shared::TwilioSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{http_client, non_empty, otp_message, transport_error};
use crate::{DeliveryError, InfrastructureError};

const PROVIDER: &str = "twilio";

/// Form body of a Twilio message request.
///
/// Exactly one sender is set: a messaging service takes precedence over a
/// plain sender number when both are configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwilioRequest {
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "From", skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(rename = "MessagingServiceSid", skip_serializing_if = "Option::is_none")]
    pub messaging_service_sid: Option<String>,
    #[serde(rename = "Body")]
    pub body: String,
}

impl TwilioRequest {
    pub fn new(
        to: &str,
        settings: &TwilioSettings,
        body: String,
    ) -> Result<Self, DeliveryError> {
        let (from, messaging_service_sid) = match (
            non_empty(&settings.messaging_service_sid),
            non_empty(&settings.from),
        ) {
            (Some(sid), _) => (None, Some(sid.to_string())),
            (None, Some(from)) => (Some(from.to_string()), None),
            (None, None) => {
                return Err(DeliveryError::configuration(
                    PROVIDER,
                    "either TWILIO_FROM or TWILIO_MESSAGING_SERVICE_SID must be set",
                ))
            }
        };

        if to.trim().is_empty() {
            return Err(DeliveryError::delivery(PROVIDER, None, "recipient is empty"));
        }

        Ok(Self {
            to: to.to_string(),
            from,
            messaging_service_sid,
            body,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

/// Error document returned by Twilio on non-2xx responses
#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    code: Option<i64>,
    message: Option<String>,
}

/// Twilio SMS service implementation
pub struct TwilioSmsService {
    client: Client,
    settings: TwilioSettings,
    timeout_secs: u64,
    ttl_minutes: u64,
}

impl TwilioSmsService {
    pub fn new(
        settings: TwilioSettings,
        timeout_secs: u64,
        ttl_minutes: u64,
    ) -> Result<Self, InfrastructureError> {
        let client = http_client(timeout_secs)?;

        match non_empty(&settings.from) {
            Some(from) => info!(
                target: "sms_service",
                provider = PROVIDER,
                from = %mask_phone_number(from),
                "Twilio SMS service initialized"
            ),
            None => info!(
                target: "sms_service",
                provider = PROVIDER,
                "Twilio SMS service initialized"
            ),
        }

        Ok(Self {
            client,
            settings,
            timeout_secs,
            ttl_minutes,
        })
    }

    fn credentials(&self) -> Result<(&str, &str), DeliveryError> {
        let account_sid = non_empty(&self.settings.account_sid).ok_or_else(|| {
            DeliveryError::configuration(PROVIDER, "TWILIO_ACCOUNT_SID is not set")
        })?;
        let auth_token = non_empty(&self.settings.auth_token).ok_or_else(|| {
            DeliveryError::configuration(PROVIDER, "TWILIO_AUTH_TOKEN is not set")
        })?;
        Ok((account_sid, auth_token))
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.settings.base_url.trim_end_matches('/'),
            account_sid
        )
    }
}

#[async_trait]
impl SmsServiceTrait for TwilioSmsService {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<DeliveryReceipt, DeliveryError> {
        let (account_sid, auth_token) = self.credentials()?;
        let request = TwilioRequest::new(phone, &self.settings, otp_message(code, self.ttl_minutes))?;
        let masked = mask_phone_number(phone);

        debug!(target: "sms_service", provider = PROVIDER, phone = %masked, "Sending SMS");

        let response = self
            .client
            .post(self.messages_url(account_sid))
            .basic_auth(account_sid, Some(auth_token))
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                error!(target: "sms_service", provider = PROVIDER, phone = %masked, error = %e, "Twilio request failed");
                transport_error(PROVIDER, e, self.timeout_secs)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let payload = match serde_json::from_str::<TwilioErrorResponse>(&body) {
                Ok(TwilioErrorResponse {
                    code: Some(code),
                    message,
                }) => format!("{}: {}", code, message.unwrap_or_default()),
                Ok(TwilioErrorResponse {
                    message: Some(message),
                    ..
                }) => message,
                _ => body,
            };
            warn!(
                target: "sms_service",
                provider = PROVIDER,
                phone = %masked,
                status = status.as_u16(),
                payload = %payload,
                "Twilio rejected the message"
            );
            return Err(DeliveryError::delivery(PROVIDER, Some(status.as_u16()), payload));
        }

        let message: TwilioMessageResponse = response.json().await.map_err(|e| {
            DeliveryError::delivery(
                PROVIDER,
                Some(status.as_u16()),
                format!("unreadable response: {}", e),
            )
        })?;

        info!(
            target: "sms_service",
            provider = PROVIDER,
            phone = %masked,
            message_id = %message.sid,
            "SMS sent"
        );

        Ok(DeliveryReceipt {
            provider: PROVIDER.to_string(),
            message_id: Some(message.sid),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
