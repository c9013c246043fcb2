//! Types for OTP service results

use chrono::{DateTime, Utc};

/// Result of issuing a passcode
#[derive(Debug, Clone)]
pub struct IssueReceipt {
    /// Canonical phone the code was bound to
    pub phone: String,
    pub expires_at: DateTime<Utc>,
    /// When the phone may request another code
    pub resend_available_at: DateTime<Utc>,
    pub provider: String,
    pub message_id: Option<String>,
    /// Plaintext code, only populated when dev code exposure is enabled
    pub dev_code: Option<String>,
}

/// Result of a verification through the auth facade
#[derive(Debug, Clone)]
pub struct VerifyResult {
    pub outcome: crate::domain::VerificationOutcome,
    /// Session credential, present only on success
    pub session_token: Option<String>,
}
