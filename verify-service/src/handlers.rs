use crate::state::AppState;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, Json};
use base64::engine::general_purpose;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::signal;
use tracing::{debug, warn};
use wipe_verifier::certificate::{Artifact, CertError, CertificateDocument, Verdict};

/// Liveness probe endpoint.
pub async fn ready() -> &'static str {
    "ready"
}

#[derive(Serialize)]
/// Response body for `/healthz`.
pub struct Health {
    pub ok: bool,
    pub uptime_secs: u64,
}

/// Health-check endpoint.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    let uptime_secs = state.started_at.elapsed().as_secs();
    (StatusCode::OK, Json(Health { ok: true, uptime_secs }))
}

/// Serves the PEM the verifier was configured with, so clients can fetch it.
pub async fn public_key(State(state): State<AppState>) -> Response {
    match &state.public_key_pem {
        Some(pem) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/x-pem-file")],
            pem.to_string(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no_public_key" })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
/// Incoming JSON body for `/api/verify`.
pub struct VerifyRequest {
    /// The certificate, either as a JSON object or as the raw pasted text.
    pub certificate: JsonValue,
    /// Uploaded report bytes (base64) to compare against `sha256Pdf`.
    #[serde(default)]
    pub artifact_b64: Option<String>,
    /// Report digest computed by the client, instead of `artifact_b64`.
    #[serde(default)]
    pub artifact_sha256: Option<String>,
}

/// Verifies one certificate. Verdicts, including `fail` and `error`, are 200s.
pub async fn verify_handler(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> (StatusCode, Json<JsonValue>) {
    let artifact = match (&req.artifact_b64, req.artifact_sha256) {
        (Some(encoded), _) => match general_purpose::STANDARD.decode(encoded.as_bytes()) {
            Ok(bytes) => Some(Artifact::Bytes(bytes)),
            Err(e) => {
                warn!(error=?e, "bad artifact base64");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid_artifact_base64" })),
                );
            }
        },
        (None, Some(digest)) => Some(Artifact::Sha256(digest)),
        (None, None) => None,
    };

    let verdict = match req.certificate {
        JsonValue::String(text) => state.verifier.verify_text(&text, artifact).await,
        JsonValue::Null => Verdict::idle(),
        value => match CertificateDocument::from_value(value) {
            Ok(doc) => state.verifier.verify_document(doc, artifact).await,
            Err(err) => Verdict::error(&err),
        },
    };
    debug!(status = ?verdict.status, "verdict produced");

    match serde_json::to_value(&verdict) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            let err = CertError::Internal(format!("serialize verdict: {e}"));
            warn!(error = %err, "verdict serialization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "verdict_serialization_failed" })),
            )
        }
    }
}

/// Blocks until Ctrl+C (or SIGTERM on Unix) to trigger graceful shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error=?e, "install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error=?e, "install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, };
}
