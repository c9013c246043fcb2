//! Process-local OTP record store
//!
//! Every operation takes the map lock for its whole duration, which makes
//! each mutation atomic. Records are lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use otp_core::domain::OtpRecord;
use otp_core::repositories::{AttemptRegistration, OtpStore};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::StoreError;

#[derive(Default)]
pub struct InMemoryOtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn upsert(&self, record: OtpRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .await
            .insert(record.phone.clone(), record);
        Ok(())
    }

    async fn find(&self, phone: &str) -> Result<Option<OtpRecord>, StoreError> {
        Ok(self.records.lock().await.get(phone).cloned())
    }

    async fn register_attempt(
        &self,
        phone: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptRegistration, StoreError> {
        let mut records = self.records.lock().await;
        let record = match records.get_mut(phone) {
            Some(record) if record.id == id => record,
            _ => return Ok(AttemptRegistration::Missing),
        };

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

    async fn consume(&self, phone: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        match records.get(phone) {
            Some(record) if record.id == id => {
                records.remove(phone);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        Ok((before - records.len()) as u64)
    }
}
