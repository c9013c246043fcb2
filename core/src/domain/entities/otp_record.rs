//! Passcode record entity for phone verification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single outstanding passcode for a phone number.
///
/// At most one record exists per phone. Issuing a new code replaces the
/// record with a fresh `id` generation, which invalidates the previous code
/// and resets `attempts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Generation identifier; changes on every issuance
    pub id: Uuid,

    /// Canonical E.164 phone number, the record key
    pub phone: String,

    /// Salted one-way digest of the passcode
    pub code_hash: String,

    /// Instant from which the record is logically dead
    pub expires_at: DateTime<Utc>,

    /// Verification attempts registered against this generation
    pub attempts: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Creates a fresh record issued at `now` and valid for `ttl`
    pub fn new(phone: String, code_hash: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone,
            code_hash,
            expires_at: now + ttl,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// A record is expired once `now` reaches `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_locked(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    /// Seconds until a new code may be issued, or `None` if the cooldown has elapsed
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Option<u64> {
        let available_at = self.created_at + cooldown;
        if now < available_at {
            let remaining = (available_at - now).num_milliseconds();
            // round partial seconds up so the client never retries too early
            Some(((remaining + 999) / 1000) as u64)
        } else {
            None
        }
    }

    /// Time left before expiry, zero once expired
    pub fn time_to_live(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn record() -> OtpRecord {
        OtpRecord::new(
            "+15551234567".to_string(),
            "digest".to_string(),
            issued_at(),
            Duration::minutes(5),
        )
    }

    #[test]
    fn test_new_record() {
        let record = record();
        assert_eq!(record.attempts, 0);
        assert_eq!(record.expires_at, issued_at() + Duration::minutes(5));
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_new_records_get_distinct_generations() {
        assert_ne!(record().id, record().id);
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let record = record();
        assert!(!record.is_expired_at(issued_at() + Duration::seconds(299)));
        assert!(record.is_expired_at(issued_at() + Duration::seconds(300)));
        assert!(record.is_expired_at(issued_at() + Duration::minutes(10)));
    }

    #[test]
    fn test_is_locked() {
        let mut record = record();
        assert!(!record.is_locked(3));
        record.attempts = 3;
        assert!(record.is_locked(3));
    }

    #[test]
    fn test_cooldown_remaining() {
        let record = record();
        let cooldown = Duration::seconds(60);

        assert_eq!(record.cooldown_remaining(issued_at(), cooldown), Some(60));
        assert_eq!(
            record.cooldown_remaining(issued_at() + Duration::milliseconds(59_500), cooldown),
            Some(1)
        );
        assert_eq!(
            record.cooldown_remaining(issued_at() + Duration::seconds(60), cooldown),
            None
        );
    }

    #[test]
    fn test_time_to_live() {
        let record = record();
        assert_eq!(
            record.time_to_live(issued_at() + Duration::minutes(2)),
            Duration::minutes(3)
        );
        assert_eq!(
            record.time_to_live(issued_at() + Duration::minutes(6)),
            Duration::zero()
        );
    }
}
