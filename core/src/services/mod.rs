//! Business services containing domain logic and use cases.

pub mod auth;
pub mod otp;
pub mod token;

// Re-export commonly used types
pub use auth::OtpAuthService;
pub use otp::{
    BcryptHasher, Clock, CodeGenerator, DeliveryReceipt, IssuanceService, IssueReceipt,
    MockClock, SecretHasher, SmsServiceTrait, SystemClock, VerificationService, VerifyResult,
};
pub use token::{JwtSessionIssuer, SessionClaims, SessionIssuer, TokenServiceConfig};
