//! Application state and factory
//!
//! `create_app` builds the actix-web application around a shared
//! [`AppState`]. The binary calls it once per worker; integration tests call
//! it directly with in-memory adapters.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use otp_core::{OtpAuthService, OtpStore, SessionIssuer, SmsServiceTrait};
use otp_shared::{Environment, ServerConfig};

use crate::handlers::{error::not_found, json_config};
use crate::middleware::create_cors;
use crate::routes;

/// Application state that holds shared services
pub struct AppState<S, R, T>
where
    S: SmsServiceTrait,
    R: OtpStore,
    T: SessionIssuer,
{
    pub auth_service: Arc<OtpAuthService<S, R, T>>,
}

impl<S, R, T> AppState<S, R, T>
where
    S: SmsServiceTrait,
    R: OtpStore,
    T: SessionIssuer,
{
    pub fn new(auth_service: Arc<OtpAuthService<S, R, T>>) -> Self {
        Self { auth_service }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<S, R, T>(
    app_state: web::Data<AppState<S, R, T>>,
    server: &ServerConfig,
    environment: Environment,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    S: SmsServiceTrait + 'static,
    R: OtpStore + 'static,
    T: SessionIssuer + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(json_config())
        // CORS answers preflights before they reach the request logger
        .wrap(TracingLogger::default())
        .wrap(create_cors(server, environment))
        .route("/health", web::get().to(health_check))
        .configure(routes::configure::<S, R, T>)
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "otp-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
