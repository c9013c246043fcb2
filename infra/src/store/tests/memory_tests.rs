//! In-memory store tests

use chrono::{Duration, Utc};
use otp_core::domain::OtpRecord;
use otp_core::repositories::OtpStore;
use std::sync::Arc;

use super::contract;
use crate::store::InMemoryOtpStore;

const PHONE: &str = "+15551234567";

#[tokio::test]
async fn test_upsert_then_find() {
    contract::upsert_then_find(&InMemoryOtpStore::new(), PHONE).await;
}

#[tokio::test]
async fn test_upsert_replaces_generation() {
    contract::upsert_replaces_generation(&InMemoryOtpStore::new(), PHONE).await;
}

#[tokio::test]
async fn test_attempts_stop_at_limit() {
    contract::attempts_stop_at_limit(&InMemoryOtpStore::new(), PHONE).await;
}

#[tokio::test]
async fn test_consume_once() {
    contract::consume_once(&InMemoryOtpStore::new(), PHONE).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attempts_are_not_lost() {
    contract::concurrent_attempts_are_not_lost(Arc::new(InMemoryOtpStore::new()), PHONE).await;
}

#[tokio::test]
async fn test_purge_removes_only_expired() {
    let store = InMemoryOtpStore::new();
    let now = Utc::now();
    store
        .upsert(OtpRecord::new(
            "+15550000001".to_string(),
            "hash".to_string(),
            now - Duration::minutes(10),
            Duration::minutes(5),
        ))
        .await
        .unwrap();
    store.upsert(contract::record(PHONE)).await.unwrap();

    assert_eq!(store.purge_expired(now).await.unwrap(), 1);
    assert_eq!(store.len().await, 1);
    assert!(store.find(PHONE).await.unwrap().is_some());
}

#[tokio::test]
async fn test_expired_record_remains_visible_until_purged() {
    let store = InMemoryOtpStore::new();
    let past = Utc::now() - Duration::minutes(10);
    store
        .upsert(OtpRecord::new(
            PHONE.to_string(),
            "hash".to_string(),
            past,
            Duration::minutes(5),
        ))
        .await
        .unwrap();

    let found = store.find(PHONE).await.unwrap().unwrap();
    assert!(found.is_expired_at(Utc::now()));
}
