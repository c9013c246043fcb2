use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;

use otp_api::{create_app, telemetry, AppState};
use otp_core::{
    IssuanceService, JwtSessionIssuer, OtpAuthService, TokenServiceConfig, VerificationService,
};
use otp_infra::sms::SmsProvider;
use otp_infra::store::{OtpStoreBackend, OtpSweeper};
use otp_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging).context("failed to install tracing subscriber")?;
    config.validate().context("invalid configuration")?;

    tracing::info!(
        environment = %config.environment,
        sms_provider = config.sms.provider.as_str(),
        store = %config.store.backend,
        "Starting phone verification API"
    );
    if config.jwt.is_using_default_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development secret");
    }

    let sms = Arc::new(
        SmsProvider::from_config(&config.sms, config.otp.ttl_minutes())
            .context("failed to set up SMS provider")?,
    );
    let store = Arc::new(
        OtpStoreBackend::connect(&config.store)
            .await
            .context("failed to connect OTP record store")?,
    );

    let issuance = IssuanceService::new(sms, store.clone(), config.otp.clone())
        .context("invalid OTP policy")?;
    let verification = VerificationService::new(store.clone(), &config.otp);
    let session_issuer = JwtSessionIssuer::new(TokenServiceConfig::from(&config.jwt));
    let auth_service = Arc::new(OtpAuthService::new(
        Arc::new(issuance),
        Arc::new(verification),
        Arc::new(session_issuer),
    ));

    let sweeper = OtpSweeper::new(store, config.store.sweep_interval_seconds).start();

    let app_state = web::Data::new(AppState::new(auth_service));
    let server_config = config.server.clone();
    let environment = config.environment;
    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || {
        create_app(app_state.clone(), &server_config, environment)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await;

    if let Some(handle) = sweeper {
        handle.shutdown().await;
    }
    tracing::info!("Server stopped");

    result.context("server error")
}
