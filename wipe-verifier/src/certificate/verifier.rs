use super::config::VerifierConfig;
use super::digest::{check_hashes, Artifact};
use super::errors::CertError;
use super::keys::{load_key, KeyState};
use super::normalize::normalize;
use super::signature::check_signature_with;
use super::types::{CertificateDocument, Verdict};
use super::verdict::{assemble, check_required, missing_field};
use tracing::{debug, info};

/// Certificate verifier with a cached, immutable public key.
///
/// Cloning is cheap; clones share the imported key.
#[derive(Debug, Clone)]
pub struct Verifier {
    cfg: VerifierConfig,
    key: KeyState,
}

impl Verifier {
    /// Constructs a verifier, fetching and importing the key from `cfg.key_source`.
    ///
    /// An unreachable key source is not an error: signatures are then skipped.
    pub async fn new(cfg: VerifierConfig) -> Self {
        let key = load_key(cfg.key_source.as_ref()).await;
        Self::with_key(cfg, key)
    }

    /// Constructs a verifier around an already-resolved key.
    pub fn with_key(cfg: VerifierConfig, key: KeyState) -> Self {
        Self { cfg, key }
    }

    /// Constructs a verifier from inline PEM text, if any.
    pub fn from_pem(cfg: VerifierConfig, pem: Option<&str>) -> Self {
        Self::with_key(cfg, KeyState::from_optional_pem(pem))
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.cfg
    }

    pub fn key(&self) -> &KeyState {
        &self.key
    }

    /// Verifies pasted or uploaded certificate text.
    ///
    /// Blank input yields an `idle` verdict and unparsable JSON an `error`
    /// verdict; nothing here returns `Err`.
    pub async fn verify_text(&self, text: &str, artifact: Option<Artifact>) -> Verdict {
        if text.trim().is_empty() {
            return Verdict::idle();
        }
        match CertificateDocument::parse(text) {
            Ok(doc) => self.verify_document(doc, artifact).await,
            Err(err) => {
                debug!(error = %err, "certificate text rejected");
                Verdict::error(&err)
            }
        }
    }

    /// Verifies a parsed document. Hashing and RSA work run on a blocking worker.
    pub async fn verify_document(&self, doc: CertificateDocument, artifact: Option<Artifact>) -> Verdict {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.verify_blocking(&doc, artifact.as_ref()))
            .await
            .unwrap_or_else(|e| Verdict::error(&CertError::Internal(format!("verification task: {e}"))))
    }

    /// Synchronous verification for callers without a runtime.
    pub fn verify_blocking(&self, doc: &CertificateDocument, artifact: Option<&Artifact>) -> Verdict {
        let normalized = normalize(doc);
        if let Err(err) = check_required(&normalized) {
            info!(error = %err, "certificate rejected");
            return missing_field(doc, &err);
        }

        let hashes = check_hashes(doc, &normalized, artifact);
        let signature = check_signature_with(
            Some(doc),
            &self.key,
            &self.cfg.pss_salt_lengths,
            self.cfg.signature_decoding,
        );
        let verdict = assemble(doc, hashes, signature, self.cfg.policy);
        info!(
            status = ?verdict.status,
            certificate_id = normalized.get_str("certificateId").unwrap_or_default(),
            "certificate verified"
        );
        verdict
    }
}
