//! Session token module
//!
//! Issues the credential handed out after a successful phone verification.

mod config;
mod service;

pub use config::TokenServiceConfig;
pub use service::{JwtSessionIssuer, SessionClaims, SessionIssuer};
