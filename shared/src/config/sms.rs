//! Delivery provider configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";
pub const DEFAULT_MSG91_BASE_URL: &str = "https://api.msg91.com";

/// Which gateway delivers passcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmsProviderKind {
    Twilio,
    Msg91,
    #[default]
    Mock,
}

impl SmsProviderKind {
    /// Parse a provider name. Empty or unrecognized names select the mock
    /// provider so that a misconfigured deployment never sends real SMS.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "twilio" => SmsProviderKind::Twilio,
            "msg91" => SmsProviderKind::Msg91,
            _ => SmsProviderKind::Mock,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SmsProviderKind::Twilio => "twilio",
            SmsProviderKind::Msg91 => "msg91",
            SmsProviderKind::Mock => "mock",
        }
    }
}

impl std::fmt::Display for SmsProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Twilio credentials. Either `from` or `messaging_service_sid` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from: Option<String>,
    pub messaging_service_sid: Option<String>,
    /// API origin, overridable for tests
    pub base_url: String,
}

impl TwilioSettings {
    pub fn from_env() -> Self {
        Self {
            account_sid: env_opt("TWILIO_ACCOUNT_SID"),
            auth_token: env_opt("TWILIO_AUTH_TOKEN"),
            from: env_opt("TWILIO_FROM"),
            messaging_service_sid: env_opt("TWILIO_MESSAGING_SERVICE_SID"),
            base_url: env_opt("TWILIO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TWILIO_BASE_URL.to_string()),
        }
    }
}

/// MSG91 credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Msg91Settings {
    pub auth_key: Option<String>,
    pub template_id: Option<String>,
    /// API origin, overridable for tests
    pub base_url: String,
}

impl Msg91Settings {
    pub fn from_env() -> Self {
        Self {
            auth_key: env_opt("MSG91_AUTH_KEY"),
            template_id: env_opt("MSG91_TEMPLATE_ID"),
            base_url: env_opt("MSG91_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MSG91_BASE_URL.to_string()),
        }
    }
}

/// SMS delivery configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SmsConfig {
    pub provider: SmsProviderKind,
    pub twilio: TwilioSettings,
    pub msg91: Msg91Settings,
    /// Timeout applied to every gateway request
    pub request_timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProviderKind::Mock,
            twilio: TwilioSettings {
                base_url: DEFAULT_TWILIO_BASE_URL.to_string(),
                ..Default::default()
            },
            msg91: Msg91Settings {
                base_url: DEFAULT_MSG91_BASE_URL.to_string(),
                ..Default::default()
            },
            request_timeout_secs: 10,
        }
    }
}

impl SmsConfig {
    /// Load from `SMS_PROVIDER`, `TWILIO_*`, `MSG91_*` and `SMS_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self {
            provider: SmsProviderKind::parse_lenient(
                &env_opt("SMS_PROVIDER").unwrap_or_default(),
            ),
            twilio: TwilioSettings::from_env(),
            msg91: Msg91Settings::from_env(),
            request_timeout_secs: env_or("SMS_REQUEST_TIMEOUT_SECS", 10),
        }
    }
}
