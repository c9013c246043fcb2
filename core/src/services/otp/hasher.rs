//! One-way hashing of passcodes at rest

use std::sync::Arc;

use crate::errors::{DomainError, DomainResult};

/// Salted, slow one-way hash for passcodes
pub trait SecretHasher: Send + Sync {
    fn hash(&self, code: &str) -> DomainResult<String>;

    /// Compare `code` against `digest`. A malformed digest is an error, never a match.
    fn verify(&self, code: &str, digest: &str) -> DomainResult<bool>;
}

/// bcrypt-backed hasher. `bcrypt::verify` compares digests in constant time.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub const DEFAULT_COST: u32 = 8;

    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl SecretHasher for BcryptHasher {
    fn hash(&self, code: &str) -> DomainResult<String> {
        bcrypt::hash(code, self.cost).map_err(|e| DomainError::Internal {
            message: format!("Failed to hash passcode: {}", e),
        })
    }

    fn verify(&self, code: &str, digest: &str) -> DomainResult<bool> {
        bcrypt::verify(code, digest).map_err(|e| DomainError::Internal {
            message: format!("Failed to verify passcode digest: {}", e),
        })
    }
}

/// Hash `code` on the blocking pool; bcrypt must not stall an async worker
pub(crate) async fn hash_off_executor(
    hasher: &Arc<dyn SecretHasher>,
    code: &str,
) -> DomainResult<String> {
    let hasher = Arc::clone(hasher);
    let code = code.to_string();
    run_blocking(move || hasher.hash(&code)).await
}

/// Compare `code` against `digest` on the blocking pool
pub(crate) async fn verify_off_executor(
    hasher: &Arc<dyn SecretHasher>,
    code: &str,
    digest: &str,
) -> DomainResult<bool> {
    let hasher = Arc::clone(hasher);
    let code = code.to_string();
    let digest = digest.to_string();
    run_blocking(move || hasher.verify(&code, &digest)).await
}

async fn run_blocking<T, F>(f: F) -> DomainResult<T>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Hashing task failed: {}", e),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    fn hasher() -> BcryptHasher {
        BcryptHasher::new(4)
    }

    #[test]
    fn test_hash_then_verify() {
        let digest = hasher().hash("123456").unwrap();
        assert_ne!(digest, "123456");
        assert!(hasher().verify("123456", &digest).unwrap());
    }

    #[test]
    fn test_other_codes_do_not_verify() {
        let digest = hasher().hash("123456").unwrap();
        for other in ["123457", "654321", "000000", "12345"] {
            assert!(!hasher().verify(other, &digest).unwrap());
        }
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hasher().hash("123456").unwrap();
        let second = hasher().hash("123456").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        assert!(hasher().verify("123456", "not-a-bcrypt-digest").is_err());
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(BcryptHasher::default().cost(), 8);
    }

    /// Records the thread each call runs on
    #[derive(Default)]
    struct ThreadRecordingHasher {
        threads: Mutex<Vec<ThreadId>>,
    }

    impl SecretHasher for ThreadRecordingHasher {
        fn hash(&self, code: &str) -> DomainResult<String> {
            self.threads.lock().unwrap().push(thread::current().id());
            Ok(format!("digest:{}", code))
        }

        fn verify(&self, code: &str, digest: &str) -> DomainResult<bool> {
            self.threads.lock().unwrap().push(thread::current().id());
            Ok(digest == format!("digest:{}", code))
        }
    }

    #[tokio::test]
    async fn test_hashing_runs_off_the_calling_thread() {
        let recorder = Arc::new(ThreadRecordingHasher::default());
        let hasher: Arc<dyn SecretHasher> = recorder.clone();
        let caller = thread::current().id();

        let digest = hash_off_executor(&hasher, "123456").await.unwrap();
        assert!(verify_off_executor(&hasher, "123456", &digest).await.unwrap());
        assert!(!verify_off_executor(&hasher, "654321", &digest).await.unwrap());

        let threads = recorder.threads.lock().unwrap();
        assert_eq!(threads.len(), 3);
        assert!(threads.iter().all(|id| *id != caller));
    }

    #[tokio::test]
    async fn test_hasher_errors_pass_through() {
        let hasher: Arc<dyn SecretHasher> = Arc::new(BcryptHasher::new(4));
        let result = verify_off_executor(&hasher, "123456", "not-a-bcrypt-digest").await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }
}
