//! Unit tests for the issuance service

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use otp_shared::OtpPolicyConfig;

use crate::errors::DomainError;
use crate::repositories::{MockOtpStore, OtpStore};
use crate::services::otp::{Clock, IssuanceService, MockClock};

use super::mocks::{FailureMode, MockSmsService};

const PHONE: &str = "+15551234567";

fn policy() -> OtpPolicyConfig {
    OtpPolicyConfig {
        hash_cost: 4,
        expose_dev_code: true,
        ..Default::default()
    }
}

struct Harness {
    sms: Arc<MockSmsService>,
    store: Arc<MockOtpStore>,
    clock: Arc<MockClock>,
    service: IssuanceService<MockSmsService, MockOtpStore>,
}

fn harness_with(config: OtpPolicyConfig, sms: MockSmsService) -> Harness {
    let sms = Arc::new(sms);
    let store = Arc::new(MockOtpStore::new());
    let clock = Arc::new(MockClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    ));
    let service = IssuanceService::new(sms.clone(), store.clone(), config)
        .unwrap()
        .with_clock(clock.clone());
    Harness {
        sms,
        store,
        clock,
        service,
    }
}

fn harness() -> Harness {
    harness_with(policy(), MockSmsService::new())
}

#[tokio::test]
async fn test_issue_success() {
    let h = harness();
    let now = h.clock.now();

    let receipt = h.service.issue(PHONE).await.unwrap();

    assert_eq!(receipt.phone, PHONE);
    assert_eq!(receipt.expires_at, now + Duration::seconds(300));
    assert_eq!(receipt.resend_available_at, now + Duration::seconds(60));
    assert!(receipt.message_id.unwrap().starts_with("mock-msg-"));

    let sent = h.sms.get_sent_code(PHONE).unwrap();
    assert_eq!(sent.len(), 6);
    assert_eq!(receipt.dev_code, Some(sent.clone()));

    let record = h.store.find(PHONE).await.unwrap().unwrap();
    assert_eq!(record.attempts, 0);
    assert_ne!(record.code_hash, sent);
    assert_eq!(record.expires_at, receipt.expires_at);
}

#[tokio::test]
async fn test_issue_normalizes_national_number() {
    let h = harness();

    let receipt = h.service.issue("98765 43210").await.unwrap();

    assert_eq!(receipt.phone, "+919876543210");
    assert!(h.sms.get_sent_code("+919876543210").is_some());
}

#[tokio::test]
async fn test_issue_invalid_phone() {
    let h = harness();

    let result = h.service.issue("not-a-phone").await;

    assert!(matches!(result, Err(DomainError::InvalidPhone)));
    assert_eq!(h.sms.sent_count(), 0);
    assert_eq!(h.store.len().await, 0);
}

#[tokio::test]
async fn test_issue_within_cooldown_is_rate_limited() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let original = h.store.find(PHONE).await.unwrap().unwrap();

    h.clock.advance(Duration::seconds(30));
    let result = h.service.issue(PHONE).await;

    match result {
        Err(DomainError::RateLimited { retry_after_seconds }) => {
            assert_eq!(retry_after_seconds, 30)
        }
        other => panic!("Expected rate limit, got {:?}", other),
    }
    assert_eq!(h.sms.sent_count(), 1);
    assert_eq!(h.store.find(PHONE).await.unwrap().unwrap(), original);
}

#[tokio::test]
async fn test_reissue_after_cooldown_replaces_record() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let first = h.store.find(PHONE).await.unwrap().unwrap();

    h.clock.advance(Duration::seconds(60));
    h.service.issue(PHONE).await.unwrap();
    let second = h.store.find(PHONE).await.unwrap().unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.attempts, 0);
    assert_eq!(h.store.len().await, 1);
    assert_eq!(h.sms.sent_count(), 2);
}

#[tokio::test]
async fn test_zero_cooldown_disables_throttle() {
    let h = harness_with(
        OtpPolicyConfig {
            resend_cooldown_seconds: 0,
            ..policy()
        },
        MockSmsService::new(),
    );

    h.service.issue(PHONE).await.unwrap();
    h.service.issue(PHONE).await.unwrap();

    assert_eq!(h.sms.sent_count(), 2);
}

#[tokio::test]
async fn test_expired_record_does_not_throttle() {
    let h = harness_with(
        OtpPolicyConfig {
            ttl_seconds: 60,
            resend_cooldown_seconds: 120,
            ..policy()
        },
        MockSmsService::new(),
    );
    h.service.issue(PHONE).await.unwrap();

    h.clock.advance(Duration::seconds(75));

    assert!(h.service.issue(PHONE).await.is_ok());
}

#[tokio::test]
async fn test_store_failure_sends_nothing() {
    let h = harness();
    h.store.set_failing(true);

    let result = h.service.issue(PHONE).await;

    assert!(matches!(result, Err(DomainError::Store(_))));
    assert_eq!(h.sms.sent_count(), 0);
}

#[tokio::test]
async fn test_delivery_failure_keeps_record() {
    let h = harness_with(policy(), MockSmsService::failing(FailureMode::Delivery));

    let result = h.service.issue(PHONE).await;

    match result {
        Err(DomainError::Delivery { provider, message }) => {
            assert_eq!(provider, "test");
            assert!(message.contains("503"));
        }
        other => panic!("Expected delivery error, got {:?}", other),
    }
    let record = h.store.find(PHONE).await.unwrap().unwrap();
    assert_eq!(record.attempts, 0);
}

#[tokio::test]
async fn test_configuration_failure() {
    let h = harness_with(policy(), MockSmsService::failing(FailureMode::Configuration));

    let result = h.service.issue(PHONE).await;

    assert!(matches!(result, Err(DomainError::Configuration { .. })));
}

#[tokio::test]
async fn test_dev_code_hidden_when_disabled() {
    let h = harness_with(
        OtpPolicyConfig {
            expose_dev_code: false,
            ..policy()
        },
        MockSmsService::new(),
    );

    let receipt = h.service.issue(PHONE).await.unwrap();

    assert!(receipt.dev_code.is_none());
}

#[tokio::test]
async fn test_invalid_policy_is_rejected() {
    let result = IssuanceService::new(
        Arc::new(MockSmsService::new()),
        Arc::new(MockOtpStore::new()),
        OtpPolicyConfig {
            code_length: 8,
            ..policy()
        },
    );

    assert!(matches!(result, Err(DomainError::Configuration { .. })));
}

#[tokio::test]
async fn test_code_length_follows_policy() {
    let h = harness_with(
        OtpPolicyConfig {
            code_length: 4,
            ..policy()
        },
        MockSmsService::new(),
    );

    h.service.issue(PHONE).await.unwrap();

    assert_eq!(h.sms.get_sent_code(PHONE).unwrap().len(), 4);
}

struct UnavailableHasher;

impl crate::services::otp::SecretHasher for UnavailableHasher {
    fn hash(&self, _code: &str) -> crate::errors::DomainResult<String> {
        Err(DomainError::Internal {
            message: "hashing unavailable".to_string(),
        })
    }

    fn verify(&self, _code: &str, _digest: &str) -> crate::errors::DomainResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_hash_failure_stores_and_sends_nothing() {
    let sms = Arc::new(MockSmsService::new());
    let store = Arc::new(MockOtpStore::new());
    let service = IssuanceService::new(sms.clone(), store.clone(), policy())
        .unwrap()
        .with_hasher(Arc::new(UnavailableHasher));

    let result = service.issue(PHONE).await;

    assert!(matches!(result, Err(DomainError::Internal { .. })));
    assert!(store.find(PHONE).await.unwrap().is_none());
    assert_eq!(sms.sent_count(), 0);
}
