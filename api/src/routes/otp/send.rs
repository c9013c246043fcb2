use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use otp_core::{OtpStore, SessionIssuer, SmsServiceTrait};
use otp_shared::phone::mask_phone_number;

use crate::app::AppState;
use crate::dto::{SendCodeRequest, SendCodeResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/auth/otp/send
///
/// Issues a passcode for the phone and hands it to the SMS provider.
///
/// # Request Body
///
/// ```json
/// { "phone": "+919876543210" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "accepted": true,
///     "message": "Verification code sent",
///     "expires_in": 300,
///     "resend_after": 60
/// }
/// ```
///
/// `dev_code` is added only when the policy opts in. Failures report
/// `accepted: false`: 400 for an invalid request or unusable phone, 429 while the resend
/// cooldown runs, 502 when the provider rejects the message and 500 for
/// configuration or store failures.
pub async fn send_code<S, R, T>(
    req: HttpRequest,
    state: web::Data<AppState<S, R, T>>,
    request: web::Json<SendCodeRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: SmsServiceTrait + 'static,
    R: OtpStore + 'static,
    T: SessionIssuer + 'static,
{
    let request = request.into_inner();
    request.validate().map_err(ApiError::on_send)?;

    tracing::info!(
        phone = %mask_phone_number(&request.phone),
        ip = %super::client_ip(&req),
        "Processing send_code request"
    );

    let receipt = state
        .auth_service
        .send_code(&request.phone)
        .await
        .map_err(ApiError::on_send)?;

    tracing::info!(
        phone = %mask_phone_number(&receipt.phone),
        provider = %receipt.provider,
        message_id = receipt.message_id.as_deref().unwrap_or("-"),
        "Verification code sent"
    );

    let policy = state.auth_service.policy();
    Ok(HttpResponse::Ok().json(SendCodeResponse {
        accepted: true,
        message: "Verification code sent".to_string(),
        expires_in: policy.ttl_seconds,
        resend_after: policy.resend_cooldown_seconds,
        dev_code: receipt.dev_code,
    }))
}
