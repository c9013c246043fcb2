//! Result of a passcode verification attempt

use serde::{Deserialize, Serialize};

/// Generic text shown to end users for every failed verification
pub const GENERIC_FAILURE_MESSAGE: &str = "Invalid or expired code";

/// Business outcome of `verify`. Failures are returned, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Success,
    NoActiveCode,
    Expired,
    TooManyAttempts,
    Mismatch,
}

impl VerificationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationOutcome::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationOutcome::Success => "success",
            VerificationOutcome::NoActiveCode => "no_active_code",
            VerificationOutcome::Expired => "expired",
            VerificationOutcome::TooManyAttempts => "too_many_attempts",
            VerificationOutcome::Mismatch => "mismatch",
        }
    }

    /// User-facing message. Failure outcomes share one text so the response
    /// does not reveal whether a code exists, expired or was wrong.
    pub fn user_message(&self) -> &'static str {
        match self {
            VerificationOutcome::Success => "Phone number verified",
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl std::fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
