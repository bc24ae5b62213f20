use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::{
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::handlers::*;
use crate::state::AppState;

/// Constructs the public HTTP router (health, key, verification) with middleware.
pub fn build_public_router(state: AppState, cfg: &Config) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/ready", get(ready))
        .route("/public-key.pem", get(public_key))
        .route("/api/verify", post(verify_handler))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(cfg.max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value as JsonValue};
    use tower::ServiceExt;
    use wipe_verifier::certificate::Verifier;

    const SIGNER_PEM: &str = include_str!("../../wipe-verifier/tests/fixtures/signer_pub.pem");
    const SIGNED_CERT: &str =
        include_str!("../../wipe-verifier/tests/fixtures/certificate_signed.json");

    fn test_config() -> Config {
        Config {
            log_level: None,
            public_addr: "127.0.0.1:0".parse().unwrap(),
            public_key_path: None,
            public_key_url: None,
            strict: true,
            request_timeout_secs: 5,
            max_body_bytes: 64 * 1024,
        }
    }

    fn app(pem: Option<&str>) -> Router {
        let cfg = test_config();
        let verifier = Verifier::from_pem(cfg.verifier_config(), pem);
        build_public_router(AppState::new(verifier, pem.map(str::to_string)), &cfg)
    }

    async fn post_json(app: Router, body: JsonValue) -> (StatusCode, JsonValue) {
        let request = Request::post("/api/verify")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let response = app(None)
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn public_key_served_when_configured() {
        let response = app(Some(SIGNER_PEM))
            .oneshot(Request::get("/public-key.pem").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("BEGIN PUBLIC KEY"));

        let response = app(None)
            .oneshot(Request::get("/public-key.pem").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn verifies_certificate_object() {
        let certificate: JsonValue = serde_json::from_str(SIGNED_CERT).unwrap();
        let (status, body) = post_json(app(Some(SIGNER_PEM)), json!({ "certificate": certificate })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["signature"]["method"], "canonical+pss(salt=32)");
    }

    #[tokio::test]
    async fn verifies_pasted_text_with_artifact_digest() {
        let (status, body) = post_json(
            app(Some(SIGNER_PEM)),
            json!({ "certificate": SIGNED_CERT, "artifact_sha256": "00" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // Strict config: the digest mismatch fails the verdict.
        assert_eq!(body["status"], "fail");
        assert_eq!(body["checks"]["hashes"]["sha256Pdf"]["outcome"], "mismatch");
    }

    #[tokio::test]
    async fn missing_field_is_a_fail_verdict() {
        let (status, body) =
            post_json(app(None), json!({ "certificate": { "certificateId": "c1" } })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "missing required field: deviceId");
    }

    #[tokio::test]
    async fn non_object_certificate_is_an_error_verdict() {
        let (_, body) = post_json(app(None), json!({ "certificate": [1, 2, 3] })).await;
        assert_eq!(body["status"], "error");
        let (_, body) = post_json(app(None), json!({ "certificate": "{oops" })).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn bad_artifact_base64_is_rejected() {
        let (status, body) = post_json(
            app(None),
            json!({ "certificate": {}, "artifact_b64": "***" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_artifact_base64");
    }
}
