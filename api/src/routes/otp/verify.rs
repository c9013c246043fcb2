use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use validator::Validate;

use otp_core::{OtpStore, SessionIssuer, SmsServiceTrait, VerificationOutcome};
use otp_shared::phone::mask_phone_number;

use crate::app::AppState;
use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/auth/otp/verify
///
/// # Request Body
///
/// ```json
/// { "phone": "+919876543210", "code": "123456" }
/// ```
///
/// # Response
///
/// 200 with `outcome: "success"` and a `session_token`. Failed checks answer
/// 401 (`mismatch`, `expired`, `no_active_code`) or 429
/// (`too_many_attempts`), always with the same generic message.
pub async fn verify_code<S, R, T>(
    req: HttpRequest,
    state: web::Data<AppState<S, R, T>>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: SmsServiceTrait + 'static,
    R: OtpStore + 'static,
    T: SessionIssuer + 'static,
{
    let request = request.into_inner();
    request.validate()?;

    let result = state
        .auth_service
        .verify_code(&request.phone, &request.code)
        .await?;

    tracing::info!(
        phone = %mask_phone_number(&request.phone),
        ip = %super::client_ip(&req),
        outcome = %result.outcome,
        "Processed verify_code request"
    );

    Ok(HttpResponse::build(status_for(result.outcome)).json(VerifyCodeResponse {
        outcome: result.outcome,
        message: result.outcome.user_message().to_string(),
        session_token: result.session_token,
    }))
}

fn status_for(outcome: VerificationOutcome) -> StatusCode {
    match outcome {
        VerificationOutcome::Success => StatusCode::OK,
        VerificationOutcome::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
        VerificationOutcome::Mismatch
        | VerificationOutcome::Expired
        | VerificationOutcome::NoActiveCode => StatusCode::UNAUTHORIZED,
    }
}
