//! # Phone Verification Core
//!
//! Domain layer for one-time passcode phone verification: the passcode
//! record entity, code generation and hashing, the store and delivery
//! seams, the issuance and verification services, and session issuance.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{OtpRecord, VerificationOutcome, GENERIC_FAILURE_MESSAGE};
pub use errors::{DeliveryError, DomainError, DomainResult, StoreError};
pub use repositories::{AttemptRegistration, OtpStore};
pub use services::{
    BcryptHasher, Clock, CodeGenerator, DeliveryReceipt, IssuanceService, IssueReceipt,
    JwtSessionIssuer, MockClock, OtpAuthService, SecretHasher, SessionClaims, SessionIssuer,
    SmsServiceTrait, SystemClock, TokenServiceConfig, VerificationService, VerifyResult,
};
