//! HTTP tests for the passcode endpoints over in-memory adapters

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, web};
    use serde_json::{json, Value};

    use otp_api::{create_app, AppState};
    use otp_core::{
        IssuanceService, JwtSessionIssuer, OtpAuthService, TokenServiceConfig,
        VerificationService,
    };
    use otp_infra::sms::SmsProvider;
    use otp_infra::store::InMemoryOtpStore;
    use otp_shared::{Environment, OtpPolicyConfig, ServerConfig, SmsConfig};

    const PHONE: &str = "+919876543210";

    type State = AppState<SmsProvider, InMemoryOtpStore, JwtSessionIssuer>;

    fn policy() -> OtpPolicyConfig {
        OtpPolicyConfig {
            hash_cost: 4,
            max_attempts: 3,
            expose_dev_code: true,
            ..Default::default()
        }
    }

    fn jwt() -> JwtSessionIssuer {
        JwtSessionIssuer::new(TokenServiceConfig {
            jwt_secret: "api-test-secret".to_string(),
            ..Default::default()
        })
    }

    fn state() -> (web::Data<State>, Arc<SmsProvider>) {
        state_with(policy())
    }

    fn state_with(policy: OtpPolicyConfig) -> (web::Data<State>, Arc<SmsProvider>) {
        let sms = Arc::new(
            SmsProvider::from_config(&SmsConfig::default(), policy.ttl_minutes()).unwrap(),
        );
        let store = Arc::new(InMemoryOtpStore::new());
        let issuance = IssuanceService::new(sms.clone(), store.clone(), policy.clone()).unwrap();
        let verification = VerificationService::new(store, &policy);
        let auth_service = OtpAuthService::new(
            Arc::new(issuance),
            Arc::new(verification),
            Arc::new(jwt()),
        );
        (web::Data::new(AppState::new(Arc::new(auth_service))), sms)
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(create_app(
                $state.clone(),
                &ServerConfig::default(),
                Environment::Development,
            ))
            .await
        };
    }

    macro_rules! post {
        ($app:expr, $uri:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri($uri)
                .set_json($body)
                .to_request();
            let resp = test::call_service(&$app, req).await;
            let status = resp.status();
            let headers = resp.headers().clone();
            let body: Value = test::read_body_json(resp).await;
            (status, headers, body)
        }};
    }

    #[actix_web::test]
    async fn test_send_code_success() {
        let (state, sms) = state();
        let app = app!(state);

        let (status, _, body) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": "98765 43210" }));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], true);
        assert_eq!(body["expires_in"], 300);
        assert_eq!(body["resend_after"], 60);
        let dev_code = body["dev_code"].as_str().unwrap();
        assert_eq!(dev_code.len(), 6);
        assert_eq!(
            sms.as_mock().unwrap().last_code_for(PHONE).as_deref(),
            Some(dev_code)
        );
    }

    #[actix_web::test]
    async fn test_send_code_hides_code_by_default() {
        let (state, sms) = state_with(OtpPolicyConfig {
            hash_cost: 4,
            ..Default::default()
        });
        let app = app!(state);

        let (status, _, body) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": PHONE }));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], true);
        assert!(body.get("dev_code").is_none());
        // still reachable through the mock provider
        assert!(sms.as_mock().unwrap().last_code_for(PHONE).is_some());
    }

    #[actix_web::test]
    async fn test_send_code_rejects_unparsable_phone() {
        let (state, _) = state();
        let app = app!(state);

        let (status, _, body) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": "call-me-maybe" }));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "PHONE_INVALID");
        assert_eq!(body["accepted"], false);
    }

    #[actix_web::test]
    async fn test_send_code_validation_error() {
        let (state, _) = state();
        let app = app!(state);

        let (status, _, body) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": "123" }));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["accepted"], false);
        assert!(body["details"]["phone"].is_array());
    }

    #[actix_web::test]
    async fn test_send_code_throttled_within_cooldown() {
        let (state, _) = state();
        let app = app!(state);

        let (first, _, _) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": PHONE }));
        let (status, headers, body) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": PHONE }));

        assert_eq!(first, StatusCode::OK);
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(body["accepted"], false);
        let retry_after = body["details"]["retry_after"].as_u64().unwrap();
        assert!(retry_after > 0 && retry_after <= 60);
        assert!(headers.contains_key("retry-after"));
    }

    #[actix_web::test]
    async fn test_send_code_delivery_failure() {
        let (state, sms) = state();
        sms.as_mock().unwrap().set_simulate_failure(true);
        let app = app!(state);

        let (status, _, body) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": PHONE }));

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["accepted"], false);
        assert_eq!(body["error"], "SMS_ERROR");
    }

    #[actix_web::test]
    async fn test_verify_code_success_returns_session() {
        let (state, _) = state();
        let app = app!(state);
        let (_, _, sent) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": PHONE }));
        let code = sent["dev_code"].as_str().unwrap().to_string();

        let (status, _, body) = post!(
            app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "code": code })
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "success");
        let token = body["session_token"].as_str().unwrap();
        assert_eq!(jwt().decode(token).unwrap().sub, PHONE);
    }

    #[actix_web::test]
    async fn test_verify_code_mismatch() {
        let (state, _) = state();
        let app = app!(state);
        let (_, _, sent) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": PHONE }));
        let wrong = if sent["dev_code"] == "000000" { "111111" } else { "000000" };

        let (status, _, body) = post!(
            app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "code": wrong })
        );

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["outcome"], "mismatch");
        assert_eq!(body["message"], "Invalid or expired code");
        assert!(body.get("session_token").is_none());
    }

    #[actix_web::test]
    async fn test_verify_code_locks_after_max_attempts() {
        let (state, _) = state();
        let app = app!(state);
        let (_, _, sent) = post!(app, "/api/v1/auth/otp/send", json!({ "phone": PHONE }));
        let code = sent["dev_code"].as_str().unwrap().to_string();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..2 {
            let (status, _, _) = post!(
                app,
                "/api/v1/auth/otp/verify",
                json!({ "phone": PHONE, "code": wrong })
            );
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        let (status, _, body) = post!(
            app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "code": wrong })
        );
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["outcome"], "too_many_attempts");

        // the correct code no longer helps
        let (status, _, body) = post!(
            app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "code": code })
        );
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["message"], "Invalid or expired code");
    }

    #[actix_web::test]
    async fn test_verify_code_without_active_code() {
        let (state, _) = state();
        let app = app!(state);

        let (status, _, body) = post!(
            app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "code": "123456" })
        );

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["outcome"], "no_active_code");
    }

    #[actix_web::test]
    async fn test_verify_code_rejects_bad_code_format() {
        let (state, _) = state();
        let app = app!(state);

        let (status, _, body) = post!(
            app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "code": "12ab" })
        );

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["details"]["code"].is_array());
    }

    #[actix_web::test]
    async fn test_malformed_json_body() {
        let (state, _) = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/otp/send")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"phone\":")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[actix_web::test]
    async fn test_health_check() {
        let (state, _) = state();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_unknown_route() {
        let (state, _) = state();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/v1/nope").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
