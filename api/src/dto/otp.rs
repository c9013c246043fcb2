use once_cell::sync::Lazy;
use otp_core::VerificationOutcome;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

static CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,6}$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendCodeRequest {
    /// E.164 or national format; normalized by the service
    /// Examples: "+919876543210", "98765 43210", "0098765-43210"
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"))]
    pub phone: String,

    /// 4 to 6 digit passcode
    #[validate(regex(path = "CODE_REGEX", message = "code must be 4 to 6 digits"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeResponse {
    pub accepted: bool,
    pub message: String,
    /// Seconds until the code expires
    pub expires_in: u64,
    /// Seconds until another code may be requested
    pub resend_after: u64,
    /// Plaintext code, outside production only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub outcome: VerificationOutcome,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}
