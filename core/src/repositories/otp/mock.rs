//! Mock implementation of OtpStore for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::OtpRecord;
use crate::errors::StoreError;

use super::store::{AttemptRegistration, OtpStore};

/// Mock OTP store for testing
pub struct MockOtpStore {
    records: Arc<RwLock<HashMap<String, OtpRecord>>>,
    should_fail: AtomicBool,
}

impl MockOtpStore {
    /// Create a new mock store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with a backend error
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::backend("mock store unavailable"));
        }
        Ok(())
    }
}

impl Default for MockOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpStore for MockOtpStore {
    async fn upsert(&self, record: OtpRecord) -> Result<(), StoreError> {
        self.check()?;
        self.records
            .write()
            .await
            .insert(record.phone.clone(), record);
        Ok(())
    }

    async fn find(&self, phone: &str) -> Result<Option<OtpRecord>, StoreError> {
        self.check()?;
        Ok(self.records.read().await.get(phone).cloned())
    }

    async fn register_attempt(
        &self,
        phone: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptRegistration, StoreError> {
        self.check()?;
        let mut records = self.records.write().await;
        match records.get_mut(phone) {
            Some(record) if record.id == id => {
                if record.attempts >= max_attempts {
                    return Ok(AttemptRegistration::Exhausted {
                        attempts: record.attempts,
                    });
                }
                record.attempts += 1;
                record.updated_at = Utc::now();
                Ok(AttemptRegistration::Registered {
                    attempts: record.attempts,
                })
            }
            _ => Ok(AttemptRegistration::Missing),
        }
    }

    async fn consume(&self, phone: &str, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut records = self.records.write().await;
        if records.get(phone).map(|r| r.id) == Some(id) {
            records.remove(phone);
            return Ok(true);
        }
        Ok(false)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check()?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        Ok((before - records.len()) as u64)
    }
}
