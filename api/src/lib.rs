//! HTTP surface for phone verification
//!
//! Exposes passcode issuance and verification over actix-web. The binary in
//! `main.rs` wires configuration, infrastructure and services together; the
//! pieces live here so integration tests can build the same application.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
