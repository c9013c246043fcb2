//! OTP Record Stores
//!
//! Implementations of the core `OtpStore` seam:
//!
//! - [`InMemoryOtpStore`]: process-local, the development default
//! - [`RedisOtpStore`]: JSON values with a Redis TTL, Lua scripts for the
//!   conditional mutations
//! - [`MySqlOtpStore`]: `otp_records` table, conditional SQL statements
//!
//! [`OtpStoreBackend`] selects one of them from [`StoreConfig`] so the rest of
//! the application can stay generic over a single concrete store type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use otp_core::domain::OtpRecord;
use otp_core::repositories::{AttemptRegistration, OtpStore};
use otp_shared::{StoreBackend, StoreConfig};
use uuid::Uuid;

use crate::{InfrastructureError, StoreError};

pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "redis-store")]
pub mod redis_store;
pub mod sweeper;

pub use memory::InMemoryOtpStore;
#[cfg(feature = "mysql")]
pub use mysql::MySqlOtpStore;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisOtpStore;
pub use sweeper::{OtpSweeper, SweeperHandle};

#[cfg(test)]
mod tests;

/// The configured record store
pub enum OtpStoreBackend {
    Memory(InMemoryOtpStore),
    #[cfg(feature = "redis-store")]
    Redis(RedisOtpStore),
    #[cfg(feature = "mysql")]
    MySql(MySqlOtpStore),
}

impl OtpStoreBackend {
    /// Connect to the backend named by `config.backend`
    pub async fn connect(config: &StoreConfig) -> Result<Self, InfrastructureError> {
        let backend = match config.backend {
            StoreBackend::Memory => OtpStoreBackend::Memory(InMemoryOtpStore::new()),
            #[cfg(feature = "redis-store")]
            StoreBackend::Redis => {
                let url = required(&config.redis_url, "REDIS_URL")?;
                OtpStoreBackend::Redis(RedisOtpStore::connect(url).await?)
            }
            #[cfg(feature = "mysql")]
            StoreBackend::Mysql => {
                let url = required(&config.database_url, "DATABASE_URL")?;
                let store = MySqlOtpStore::connect(url, config.max_connections).await?;
                store.migrate().await?;
                OtpStoreBackend::MySql(store)
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(InfrastructureError::Config(format!(
                    "store backend '{}' is not compiled in",
                    other
                )))
            }
        };

        tracing::info!(backend = backend.name(), "OTP record store ready");
        Ok(backend)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OtpStoreBackend::Memory(_) => "memory",
            #[cfg(feature = "redis-store")]
            OtpStoreBackend::Redis(_) => "redis",
            #[cfg(feature = "mysql")]
            OtpStoreBackend::MySql(_) => "mysql",
        }
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, InfrastructureError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| InfrastructureError::Config(format!("{} must be set", key)))
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            OtpStoreBackend::Memory($store) => $call,
            #[cfg(feature = "redis-store")]
            OtpStoreBackend::Redis($store) => $call,
            #[cfg(feature = "mysql")]
            OtpStoreBackend::MySql($store) => $call,
        }
    };
}

#[async_trait]
impl OtpStore for OtpStoreBackend {
    async fn upsert(&self, record: OtpRecord) -> Result<(), StoreError> {
        dispatch!(self, store => store.upsert(record).await)
    }

    async fn find(&self, phone: &str) -> Result<Option<OtpRecord>, StoreError> {
        dispatch!(self, store => store.find(phone).await)
    }

    async fn register_attempt(
        &self,
        phone: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptRegistration, StoreError> {
        dispatch!(self, store => store.register_attempt(phone, id, max_attempts).await)
    }

    async fn consume(&self, phone: &str, id: Uuid) -> Result<bool, StoreError> {
        dispatch!(self, store => store.consume(phone, id).await)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        dispatch!(self, store => store.purge_expired(now).await)
    }
}
