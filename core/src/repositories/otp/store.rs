//! OTP store trait defining the interface for passcode record persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::OtpRecord;
use crate::errors::StoreError;

/// Result of reserving a verification attempt against a record generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptRegistration {
    /// The attempt was counted; `attempts` is the new total
    Registered { attempts: u32 },
    /// The record already reached the limit; nothing was counted
    Exhausted { attempts: u32 },
    /// No record with that generation exists anymore
    Missing,
}

/// Keyed store holding at most one `OtpRecord` per phone.
///
/// Every mutation must be atomic with respect to concurrent calls for the
/// same phone. `register_attempt` and `consume` are conditional on the record
/// generation `id`, so a caller acting on a stale read can never touch a
/// record issued after it.
///
/// Expired records may still be returned by `find`; callers decide expiry
/// against their own clock.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Insert or replace the record for `record.phone`
    async fn upsert(&self, record: OtpRecord) -> Result<(), StoreError>;

    async fn find(&self, phone: &str) -> Result<Option<OtpRecord>, StoreError>;

    /// Increment `attempts` only if the stored record is generation `id`
    /// and still below `max_attempts`
    async fn register_attempt(
        &self,
        phone: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptRegistration, StoreError>;

    /// Delete the record only if it is still generation `id`.
    /// Returns `true` when this call removed it.
    async fn consume(&self, phone: &str, id: Uuid) -> Result<bool, StoreError>;

    /// Physically remove records expired at `now`; returns how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
