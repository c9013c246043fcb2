//! Route registration

pub mod otp;

use actix_web::web;
use otp_core::{OtpStore, SessionIssuer, SmsServiceTrait};

/// Register the `/api/v1` routes
pub fn configure<S, R, T>(cfg: &mut web::ServiceConfig)
where
    S: SmsServiceTrait + 'static,
    R: OtpStore + 'static,
    T: SessionIssuer + 'static,
{
    cfg.service(
        web::scope("/api/v1/auth/otp")
            .route("/send", web::post().to(otp::send::send_code::<S, R, T>))
            .route("/verify", web::post().to(otp::verify::verify_code::<S, R, T>)),
    );
}
