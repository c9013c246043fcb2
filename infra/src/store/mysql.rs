//! MySQL-backed OTP record store
//!
//! Records live in the `otp_records` table keyed by `phone` (see
//! `migrations/`). Replacement is a single upsert statement, consumption a
//! conditional delete, and attempt registration a row-locking transaction so
//! the returned counter is exactly the one this call wrote.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use otp_core::domain::OtpRecord;
use otp_core::repositories::{AttemptRegistration, OtpStore};
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::{InfrastructureError, StoreError};

pub struct MySqlOtpStore {
    pool: MySqlPool,
}

impl MySqlOtpStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, InfrastructureError> {
        tracing::info!(
            "Creating OTP store connection pool with max_connections: {}",
            max_connections
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Apply the schema in `infra/migrations`
    pub async fn migrate(&self) -> Result<(), InfrastructureError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InfrastructureError::Database(e.into()))
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    fn row_to_record(row: &MySqlRow) -> Result<OtpRecord, StoreError> {
        let id: String = row.try_get("id").map_err(backend)?;
        Ok(OtpRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| StoreError::corrupt(format!("Invalid record UUID: {}", e)))?,
            phone: row.try_get("phone").map_err(backend)?,
            code_hash: row.try_get("code_hash").map_err(backend)?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at").map_err(backend)?,
            attempts: row.try_get::<u32, _>("attempts").map_err(backend)?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(backend)?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(backend)?,
        })
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    InfrastructureError::from(err).into()
}

#[async_trait]
impl OtpStore for MySqlOtpStore {
    async fn upsert(&self, record: OtpRecord) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO otp_records (
                phone, id, code_hash, expires_at, attempts, created_at, updated_at
            ) VALUES (?, ?, ?, ?, 0, ?, ?)
            ON DUPLICATE KEY UPDATE
                id = VALUES(id),
                code_hash = VALUES(code_hash),
                expires_at = VALUES(expires_at),
                attempts = 0,
                created_at = VALUES(created_at),
                updated_at = VALUES(updated_at)
        "#;

        sqlx::query(query)
            .bind(&record.phone)
            .bind(record.id.to_string())
            .bind(&record.code_hash)
            .bind(record.expires_at)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(())
    }

    async fn find(&self, phone: &str) -> Result<Option<OtpRecord>, StoreError> {
        let query = r#"
            SELECT phone, id, code_hash, expires_at, attempts, created_at, updated_at
            FROM otp_records
            WHERE phone = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn register_attempt(
        &self,
        phone: &str,
        id: Uuid,
        max_attempts: u32,
    ) -> Result<AttemptRegistration, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query("SELECT id, attempts FROM otp_records WHERE phone = ? FOR UPDATE")
            .bind(phone)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;

        let Some(row) = row else {
            return Ok(AttemptRegistration::Missing);
        };
        let stored_id: String = row.try_get("id").map_err(backend)?;
        let attempts: u32 = row.try_get("attempts").map_err(backend)?;

        if stored_id != id.to_string() {
            return Ok(AttemptRegistration::Missing);
        }
        if attempts >= max_attempts {
            return Ok(AttemptRegistration::Exhausted { attempts });
        }

        sqlx::query(
            "UPDATE otp_records SET attempts = attempts + 1, updated_at = ? WHERE phone = ? AND id = ?",
        )
        .bind(Utc::now())
        .bind(phone)
        .bind(stored_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        Ok(AttemptRegistration::Registered {
            attempts: attempts + 1,
        })
    }

    async fn consume(&self, phone: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM otp_records WHERE phone = ? AND id = ?")
            .bind(phone)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM otp_records WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected())
    }
}
