//! CORS configuration for browser and mobile clients.
//!
//! Outside production any origin is accepted. In production only the origins
//! listed in `CORS_ALLOWED_ORIGINS` are, and an empty list keeps every
//! cross-origin request out.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use otp_shared::{Environment, ServerConfig};

const PREFLIGHT_MAX_AGE: usize = 3600;

/// Build the CORS middleware for `environment`
pub fn create_cors(server: &ServerConfig, environment: Environment) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
            header::HeaderName::from_static("x-requested-with"),
            header::HeaderName::from_static("x-app-version"),
            header::HeaderName::from_static("x-platform"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(PREFLIGHT_MAX_AGE);

    if !environment.is_production() {
        tracing::debug!(environment = %environment, "CORS allows any origin");
        return cors.allow_any_origin();
    }

    if server.allowed_origins.is_empty() {
        tracing::warn!("No CORS origins configured for production; cross-origin requests are rejected");
    }

    server.allowed_origins.iter().fold(cors, |cors, origin| {
        tracing::debug!(origin = %origin, "Adding allowed CORS origin");
        cors.allowed_origin(origin)
    })
}
