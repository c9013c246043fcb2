//! Mapping of domain and request errors to HTTP responses

use actix_web::{
    error::{InternalError, JsonPayloadError, ResponseError},
    http::{header, StatusCode},
    web, HttpRequest, HttpResponse,
};
use otp_core::DomainError;
use otp_shared::{error_codes, ErrorResponse};
use serde::Serialize;
use validator::ValidationErrors;

/// Error returned by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    /// Failure on the send path; the body reports `accepted: false`
    #[error("{0}")]
    Send(Box<ApiError>),

    #[error("{0}")]
    Domain(#[from] DomainError),
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    accepted: Option<bool>,
    #[serde(flatten)]
    error: ErrorResponse,
}

impl ApiError {
    /// Wrap a failure raised while handling a send request
    pub fn on_send(error: impl Into<ApiError>) -> Self {
        match error.into() {
            send @ ApiError::Send(_) => send,
            other => ApiError::Send(Box::new(other)),
        }
    }

    fn domain_error(&self) -> Option<&DomainError> {
        match self {
            ApiError::Send(inner) => inner.domain_error(),
            ApiError::Domain(e) => Some(e),
            ApiError::Validation(_) => None,
        }
    }

    fn body(&self) -> ErrorResponse {
        let error = match self {
            ApiError::Send(inner) => return inner.body(),
            ApiError::Validation(errors) => {
                let mut response =
                    ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data");
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    response = response.add_detail(field, messages);
                }
                return response;
            }
            ApiError::Domain(e) => e,
        };

        match error {
            DomainError::InvalidPhone => {
                ErrorResponse::new(error_codes::PHONE_INVALID, "Invalid phone number")
            }
            DomainError::RateLimited {
                retry_after_seconds,
            } => ErrorResponse::new(
                error_codes::RATE_LIMIT_EXCEEDED,
                format!(
                    "Please wait {} seconds before requesting a new code",
                    retry_after_seconds
                ),
            )
            .add_detail("retry_after", retry_after_seconds),
            DomainError::Delivery { provider, .. } => ErrorResponse::new(
                error_codes::SMS_ERROR,
                "The SMS provider did not confirm delivery. The code may still arrive; \
                 a new one can be requested once the resend cooldown has passed",
            )
            .add_detail("provider", provider),
            DomainError::Configuration { .. } => ErrorResponse::new(
                error_codes::CONFIGURATION_ERROR,
                "SMS delivery is not configured",
            ),
            DomainError::Store(_) => ErrorResponse::new(
                error_codes::STORE_ERROR,
                "Verification is temporarily unavailable",
            ),
            DomainError::Token { .. } | DomainError::Internal { .. } => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.domain_error() {
            None => StatusCode::BAD_REQUEST,
            Some(DomainError::InvalidPhone) => StatusCode::BAD_REQUEST,
            Some(DomainError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Some(DomainError::Delivery { .. }) => StatusCode::BAD_GATEWAY,
            Some(DomainError::Configuration { .. })
            | Some(DomainError::Store(_))
            | Some(DomainError::Token { .. })
            | Some(DomainError::Internal { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(DomainError::RateLimited {
            retry_after_seconds,
        }) = self.domain_error()
        {
            builder.insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()));
        }

        builder.json(ErrorBody {
            accepted: matches!(self, ApiError::Send(_)).then_some(false),
            error: self.body(),
        })
    }
}

/// JSON extractor config answering malformed bodies in the standard error shape
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4096)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let response = HttpResponse::BadRequest().json(ErrorResponse::new(
                error_codes::BAD_REQUEST,
                format!("Malformed request body: {}", err),
            ));
            InternalError::from_response(err, response).into()
        })
}

/// Default handler for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        "NOT_FOUND",
        "The requested resource was not found",
    ))
}
