//! Mock SMS service for development and tests
//!
//! Never touches the network. The passcode is written to the log so it can
//! be read during local development, and the last code per phone is kept in
//! memory for tests.

use async_trait::async_trait;
use otp_core::services::{DeliveryReceipt, SmsServiceTrait};
use otp_shared::phone::mask_phone_number;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::otp_message;
use crate::DeliveryError;

const PROVIDER: &str = "mock";

/// Mock SMS service
pub struct MockSmsService {
    ttl_minutes: u64,
    message_counter: AtomicU64,
    simulate_failure: AtomicBool,
    last_codes: Mutex<HashMap<String, String>>,
}

impl MockSmsService {
    pub fn new(ttl_minutes: u64) -> Self {
        Self {
            ttl_minutes,
            message_counter: AtomicU64::new(0),
            simulate_failure: AtomicBool::new(false),
            last_codes: Mutex::new(HashMap::new()),
        }
    }

    /// Make subsequent sends fail with a delivery error
    pub fn set_simulate_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    /// Number of messages "sent"
    pub fn message_count(&self) -> u64 {
        self.message_counter.load(Ordering::SeqCst)
    }

    /// Most recent code sent to `phone`
    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        self.last_codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(phone)
            .cloned()
    }
}

#[async_trait]
impl SmsServiceTrait for MockSmsService {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<DeliveryReceipt, DeliveryError> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err(DeliveryError::delivery(PROVIDER, None, "simulated failure"));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        self.message_counter.fetch_add(1, Ordering::SeqCst);
        self.last_codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(phone.to_string(), code.to_string());

        // plaintext only ever appears here
        info!(
            target: "sms_service",
            provider = PROVIDER,
            phone = %mask_phone_number(phone),
            message_id = %message_id,
            body = %otp_message(code, self.ttl_minutes),
            "Mock SMS sent"
        );

        Ok(DeliveryReceipt {
            provider: PROVIDER.to_string(),
            message_id: Some(message_id),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
