//! Phone verification facade used by the HTTP layer

use std::sync::Arc;

use otp_shared::phone::mask_phone_number;
use otp_shared::OtpPolicyConfig;

use crate::errors::DomainResult;
use crate::repositories::OtpStore;
use crate::services::otp::{
    IssuanceService, IssueReceipt, SmsServiceTrait, VerificationService, VerifyResult,
};
use crate::services::token::SessionIssuer;

/// Combines issuance, verification and session issuance
pub struct OtpAuthService<S, R, T>
where
    S: SmsServiceTrait,
    R: OtpStore,
    T: SessionIssuer,
{
    issuance_service: Arc<IssuanceService<S, R>>,
    verification_service: Arc<VerificationService<R>>,
    session_issuer: Arc<T>,
}

impl<S, R, T> OtpAuthService<S, R, T>
where
    S: SmsServiceTrait,
    R: OtpStore,
    T: SessionIssuer,
{
    pub fn new(
        issuance_service: Arc<IssuanceService<S, R>>,
        verification_service: Arc<VerificationService<R>>,
        session_issuer: Arc<T>,
    ) -> Self {
        Self {
            issuance_service,
            verification_service,
            session_issuer,
        }
    }

    pub fn policy(&self) -> &OtpPolicyConfig {
        self.issuance_service.config()
    }

    /// Issue and deliver a passcode
    pub async fn send_code(&self, raw_phone: &str) -> DomainResult<IssueReceipt> {
        self.issuance_service.issue(raw_phone).await
    }

    /// Verify a passcode and, on success, issue a session token
    pub async fn verify_code(&self, raw_phone: &str, code: &str) -> DomainResult<VerifyResult> {
        let outcome = self.verification_service.verify(raw_phone, code).await?;
        if !outcome.is_success() {
            return Ok(VerifyResult {
                outcome,
                session_token: None,
            });
        }

        // success implies the phone normalized
        let phone = self
            .verification_service
            .normalize(raw_phone)
            .unwrap_or_else(|| raw_phone.to_string());
        let token = self.session_issuer.issue(&phone)?;
        tracing::info!(
            phone = %mask_phone_number(&phone),
            event = "session_issued",
            "Issued session token after phone verification"
        );

        Ok(VerifyResult {
            outcome,
            session_token: Some(token),
        })
    }
}
