//! Redis-backed OTP record store
//!
//! One JSON document per phone under `otp:record:{phone}`. The key carries a
//! Redis TTL matching the record expiry, so Redis reclaims dead records on
//! its own. The conditional mutations run as Lua scripts, which Redis
//! executes atomically.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use otp_core::domain::OtpRecord;
use otp_core::repositories::{AttemptRegistration, OtpStore};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, Script};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{InfrastructureError, StoreError};

const DEFAULT_KEY_PREFIX: &str = "otp:record:";

/// KEYS[1] record key; ARGV[1] generation id, ARGV[2] max attempts,
/// ARGV[3] update timestamp. Returns {status, attempts} where status is
/// 0 missing, 1 registered, 2 exhausted.
const REGISTER_ATTEMPT_LUA: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return {0, 0}
end
local record = cjson.decode(raw)
if record['id'] ~= ARGV[1] then
  return {0, 0}
end
local attempts = tonumber(record['attempts'])
if attempts >= tonumber(ARGV[2]) then
  return {2, attempts}
end
record['attempts'] = attempts + 1
record['updated_at'] = ARGV[3]
redis.call('SET', KEYS[1], cjson.encode(record), 'KEEPTTL')
return {1, attempts + 1}
"#;

/// KEYS[1] record key; ARGV[1] generation id. Returns 1 when deleted.
const CONSUME_LUA: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return 0
end
local record = cjson.decode(raw)
if record['id'] ~= ARGV[1] then
  return 0
end
redis.call('DEL', KEYS[1])
return 1
"#;

pub struct RedisOtpStore {
    connection: MultiplexedConnection,
    key_prefix: String,
    register_attempt_script: Script,
    consume_script: Script,
}

impl RedisOtpStore {
    /// Connect with three attempts and exponential backoff
    pub async fn connect(url: &str) -> Result<Self, InfrastructureError> {
        Self::connect_with_retry(url, 3, 100).await
    }

    pub async fn connect_with_retry(
        url: &str,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(url), "Connecting OTP store to Redis");

        let client = Client::open(url).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let mut attempts = 0;
        let mut delay = retry_delay_ms;
        let connection = loop {
            attempts += 1;
            match client.get_multiplexed_async_connection().await {
                Ok(connection) => break connection,
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(e.into());
                }
            }
        };

        Ok(Self {
            connection,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            register_attempt_script: Script::new(REGISTER_ATTEMPT_LUA),
            consume_script: Script::new(CONSUME_LUA),
        })
    }

    /// Namespace keys, mainly so tests do not collide with live data
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn key(&self, phone: &str) -> String {
        format!("{}{}", self.key_prefix, phone)
    }
}

fn backend(err: RedisError) -> StoreError {
    InfrastructureError::from(err).into()
}

fn corrupt(err: serde_json::Error) -> StoreError {
    InfrastructureError::from(err).into()
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn upsert(&self, record: OtpRecord) -> Result<(), StoreError> {
        let ttl_ms = record.time_to_live(Utc::now()).num_milliseconds().max(1);
        let value = serde_json::to_string(&record).map_err(corrupt)?;
        let mut conn = self.connection.clone();

        redis::cmd("SET")
            .arg(self.key(&record.phone))
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(backend)
    }

    async fn find(&self, phone: &str) -> Result<Option<OtpRecord>, StoreError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(self.key(phone)).await.map_err(backend)?;
        raw.map(|value| serde_json::from_str(&value).map_err(corrupt))
            .transpose()
    }

    async fn register_attempt(
        &self,
        phone: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptRegistration, StoreError> {
        let mut conn = self.connection.clone();
        let (status, attempts): (i64, i64) = self
            .register_attempt_script
            .key(self.key(phone))
            .arg(id.to_string())
            .arg(max_attempts)
            .arg(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;

        let attempts = u32::try_from(attempts)
            .map_err(|_| StoreError::corrupt(format!("attempt counter out of range: {}", attempts)))?;
        match status {
            1 => Ok(AttemptRegistration::Registered { attempts }),
            2 => Ok(AttemptRegistration::Exhausted { attempts }),
            _ => Ok(AttemptRegistration::Missing),
        }
    }

    async fn consume(&self, phone: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let deleted: i64 = self
            .consume_script
            .key(self.key(phone))
            .arg(id.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(deleted == 1)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, StoreError> {
        debug!("Redis reclaims expired OTP records through key TTLs");
        Ok(0)
    }
}

/// Hide the password part of a Redis URL
fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
