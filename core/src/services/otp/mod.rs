//! OTP service module for phone verification
//!
//! This module provides the passcode workflow:
//! - Code generation and hashing at rest
//! - Issuance with resend throttling and provider delivery
//! - Verification with expiry and bounded attempts

mod clock;
mod generator;
mod hasher;
mod issuance;
mod traits;
mod types;
mod verification;

#[cfg(test)]
pub(crate) mod tests;

pub use clock::{Clock, MockClock, SystemClock};
pub use generator::CodeGenerator;
pub use hasher::{BcryptHasher, SecretHasher};
pub use issuance::IssuanceService;
pub use traits::{DeliveryReceipt, SmsServiceTrait};
pub use types::{IssueReceipt, VerifyResult};
pub use verification::VerificationService;
