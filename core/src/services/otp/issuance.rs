//! Passcode issuance: normalize, throttle, generate, hash, persist, deliver

use chrono::Duration;
use std::sync::Arc;

use otp_shared::phone::{mask_phone_number, normalize_phone_number};
use otp_shared::OtpPolicyConfig;

use crate::domain::entities::OtpRecord;
use crate::errors::{DeliveryError, DomainError, DomainResult};
use crate::repositories::OtpStore;

use super::clock::{Clock, SystemClock};
use super::generator::CodeGenerator;
use super::hasher::{hash_off_executor, BcryptHasher, SecretHasher};
use super::traits::SmsServiceTrait;
use super::types::IssueReceipt;

/// Issues passcodes and hands them to the delivery provider
pub struct IssuanceService<S: SmsServiceTrait, R: OtpStore> {
    sms_service: Arc<S>,
    store: Arc<R>,
    hasher: Arc<dyn SecretHasher>,
    clock: Arc<dyn Clock>,
    generator: CodeGenerator,
    config: OtpPolicyConfig,
}

impl<S: SmsServiceTrait, R: OtpStore> IssuanceService<S, R> {
    /// Create a new issuance service
    ///
    /// Fails when the policy is invalid (code length, TTL or attempts).
    pub fn new(sms_service: Arc<S>, store: Arc<R>, config: OtpPolicyConfig) -> DomainResult<Self> {
        config.validate().map_err(|e| DomainError::Configuration {
            message: e.to_string(),
        })?;
        let generator = CodeGenerator::new(config.code_length)?;

        Ok(Self {
            sms_service,
            store,
            hasher: Arc::new(BcryptHasher::new(config.hash_cost)),
            clock: Arc::new(SystemClock),
            generator,
            config,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &OtpPolicyConfig {
        &self.config
    }

    /// Issue a new passcode for `raw_phone`
    ///
    /// The record is committed before delivery is attempted. If delivery
    /// fails the error is returned but the stored code stays valid until it
    /// expires or is replaced.
    pub async fn issue(&self, raw_phone: &str) -> DomainResult<IssueReceipt> {
        let phone = normalize_phone_number(raw_phone, &self.config.default_country_code)
            .ok_or(DomainError::InvalidPhone)?;
        let masked = mask_phone_number(&phone);
        let now = self.clock.now();
        let cooldown = Duration::seconds(self.config.resend_cooldown_seconds as i64);

        if self.config.resend_cooldown_seconds > 0 {
            if let Some(existing) = self.store.find(&phone).await? {
                if !existing.is_expired_at(now) {
                    if let Some(retry_after_seconds) = existing.cooldown_remaining(now, cooldown) {
                        tracing::warn!(
                            phone = %masked,
                            retry_after_seconds = retry_after_seconds,
                            event = "otp_rate_limited",
                            "Passcode requested again before the resend cooldown elapsed"
                        );
                        return Err(DomainError::RateLimited { retry_after_seconds });
                    }
                }
            }
        }

        let code = self.generator.generate();
        let code_hash = hash_off_executor(&self.hasher, &code).await?;
        let record = OtpRecord::new(
            phone.clone(),
            code_hash,
            now,
            Duration::seconds(self.config.ttl_seconds as i64),
        );
        let expires_at = record.expires_at;
        let generation = record.id;

        self.store.upsert(record).await.map_err(|e| {
            tracing::error!(
                phone = %masked,
                error = %e,
                event = "otp_storage_failed",
                "Failed to store passcode record"
            );
            DomainError::from(e)
        })?;

        tracing::info!(
            phone = %masked,
            generation = %generation,
            expires_at = %expires_at,
            event = "otp_issued",
            "Issued new passcode"
        );

        let receipt = self
            .sms_service
            .send_otp(&phone, &code)
            .await
            .map_err(|e| {
                match &e {
                    DeliveryError::Configuration { .. } => tracing::error!(
                        phone = %masked,
                        provider = e.provider(),
                        error = %e,
                        event = "otp_delivery_misconfigured",
                        "SMS provider is not configured"
                    ),
                    DeliveryError::Delivery { status, .. } => tracing::warn!(
                        phone = %masked,
                        provider = e.provider(),
                        status = ?status,
                        error = %e,
                        event = "otp_delivery_failed",
                        "SMS delivery failed; stored passcode remains valid"
                    ),
                }
                DomainError::from(e)
            })?;

        tracing::info!(
            phone = %masked,
            provider = %receipt.provider,
            message_id = ?receipt.message_id,
            event = "otp_delivered",
            "Passcode handed to SMS provider"
        );

        Ok(IssueReceipt {
            phone,
            expires_at,
            resend_available_at: now + cooldown,
            provider: receipt.provider,
            message_id: receipt.message_id,
            dev_code: self.config.expose_dev_code.then_some(code),
        })
    }
}
