//! JWT session issuance

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::services::otp::{Clock, SystemClock};

use super::config::TokenServiceConfig;

/// Issues a session credential for a verified phone
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, phone: &str) -> DomainResult<String>;
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Verified phone number
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub jti: String,
}

/// HS256 JWT session issuer
pub struct JwtSessionIssuer {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtSessionIssuer {
    pub fn new(config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.validate_exp = true;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Decode and validate a session token
    pub fn decode(&self, token: &str) -> DomainResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::Token {
                message: format!("Invalid session token: {}", e),
            })
    }
}

impl SessionIssuer for JwtSessionIssuer {
    fn issue(&self, phone: &str) -> DomainResult<String> {
        let now = self.clock.now();
        let claims = SessionClaims {
            sub: phone.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.expiry_days)).timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, event = "session_token_failed", "Failed to sign session token");
            DomainError::Token {
                message: "Failed to sign session token".to_string(),
            }
        })
    }
}
