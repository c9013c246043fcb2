//! Passcode verification state machine

use std::sync::Arc;

use otp_shared::phone::{mask_phone_number, normalize_phone_number};
use otp_shared::OtpPolicyConfig;

use crate::domain::VerificationOutcome;
use crate::errors::DomainResult;
use crate::repositories::{AttemptRegistration, OtpStore};

use super::clock::{Clock, SystemClock};
use super::hasher::{verify_off_executor, BcryptHasher, SecretHasher};

/// Verifies submitted passcodes against the stored record.
///
/// Checks run in a fixed order: existence, expiry, attempt limit, then the
/// hash comparison. The attempt is reserved in the store before the hash is
/// compared, so concurrent guesses for one phone can never exceed the limit.
pub struct VerificationService<R: OtpStore> {
    store: Arc<R>,
    hasher: Arc<dyn SecretHasher>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
    default_country_code: String,
}

impl<R: OtpStore> VerificationService<R> {
    pub fn new(store: Arc<R>, config: &OtpPolicyConfig) -> Self {
        Self {
            store,
            hasher: Arc::new(BcryptHasher::new(config.hash_cost)),
            clock: Arc::new(SystemClock),
            max_attempts: config.max_attempts.max(1),
            default_country_code: config.default_country_code.clone(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Canonical form of `raw_phone` under this service's country default
    pub fn normalize(&self, raw_phone: &str) -> Option<String> {
        normalize_phone_number(raw_phone, &self.default_country_code)
    }

    /// Verify `code` for `raw_phone`.
    ///
    /// Business failures come back as `Ok(outcome)`. Store and hashing
    /// failures are errors; they never turn into an outcome.
    pub async fn verify(&self, raw_phone: &str, code: &str) -> DomainResult<VerificationOutcome> {
        let Some(phone) = self.normalize(raw_phone) else {
            tracing::debug!(event = "otp_verify_invalid_phone", "Verification for unparsable phone");
            return Ok(VerificationOutcome::NoActiveCode);
        };
        let masked = mask_phone_number(&phone);

        let Some(record) = self.store.find(&phone).await? else {
            return Ok(self.finish(&masked, VerificationOutcome::NoActiveCode));
        };

        let now = self.clock.now();
        if record.is_expired_at(now) {
            return Ok(self.finish(&masked, VerificationOutcome::Expired));
        }
        if record.is_locked(self.max_attempts) {
            return Ok(self.finish(&masked, VerificationOutcome::TooManyAttempts));
        }

        let attempts = match self
            .store
            .register_attempt(&phone, record.id, self.max_attempts)
            .await?
        {
            AttemptRegistration::Registered { attempts } => attempts,
            AttemptRegistration::Exhausted { .. } => {
                return Ok(self.finish(&masked, VerificationOutcome::TooManyAttempts));
            }
            // replaced or consumed between the read and the reservation
            AttemptRegistration::Missing => {
                return Ok(self.finish(&masked, VerificationOutcome::NoActiveCode));
            }
        };

        if verify_off_executor(&self.hasher, code, &record.code_hash).await? {
            let outcome = if self.store.consume(&phone, record.id).await? {
                VerificationOutcome::Success
            } else {
                VerificationOutcome::NoActiveCode
            };
            return Ok(self.finish(&masked, outcome));
        }

        let outcome = if attempts >= self.max_attempts {
            VerificationOutcome::TooManyAttempts
        } else {
            VerificationOutcome::Mismatch
        };
        tracing::warn!(
            phone = %masked,
            attempts = attempts,
            max_attempts = self.max_attempts,
            event = "otp_mismatch",
            "Submitted passcode did not match"
        );
        Ok(self.finish(&masked, outcome))
    }

    fn finish(&self, masked: &str, outcome: VerificationOutcome) -> VerificationOutcome {
        if outcome.is_success() {
            tracing::info!(phone = %masked, event = "otp_verified", "Passcode verified");
        } else {
            tracing::info!(
                phone = %masked,
                outcome = outcome.as_str(),
                event = "otp_verify_rejected",
                "Passcode verification rejected"
            );
        }
        outcome
    }
}
