use crate::certificate::errors::CertError;
use crate::certificate::util::sha256_fingerprint;
use anyhow::{anyhow, Context};
use ring::digest::{digest, SHA256};
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::signature::Verifier as _;
use rsa::traits::PublicKeyParts as _;
use rsa::{Pss, RsaPublicKey};
use rustls_pemfile::Item;
use sha2::Sha256;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// RSA public key imported for both padding schemes the verifier tries.
///
/// The PKCS#1 v1.5 and PSS handles share one modulus; both use SHA-256.
pub struct VerificationKey {
    pkcs1: pkcs1v15::VerifyingKey<Sha256>,
    pss: RsaPublicKey,
    fingerprint: String,
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("bits", &self.bits())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl VerificationKey {
    /// Imports the first `PUBLIC KEY` (SPKI) or `CERTIFICATE` block found in `pem`.
    pub fn from_pem(pem: &str) -> Result<Self, CertError> {
        let mut cursor = Cursor::new(pem.as_bytes());
        for item in rustls_pemfile::read_all(&mut cursor) {
            let item = item.map_err(|e| CertError::KeyImport(format!("parse PEM: {e}")))?;
            match item {
                Item::SubjectPublicKeyInfo(spki) => return Self::from_spki_der(spki.as_ref()),
                Item::X509Certificate(cert) => {
                    let spki = extract_spki(cert.as_ref()).map_err(CertError::KeyImport)?;
                    return Self::from_spki_der(&spki);
                }
                _ => continue,
            }
        }
        Err(CertError::KeyImport(
            "no PUBLIC KEY or CERTIFICATE block in PEM".into(),
        ))
    }

    /// Imports a DER-encoded SubjectPublicKeyInfo holding an RSA key.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, CertError> {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CertError::KeyImport(format!("bad RSA public key: {e}")))?;
        Ok(Self {
            pkcs1: pkcs1v15::VerifyingKey::<Sha256>::new(key.clone()),
            pss: key,
            fingerprint: sha256_fingerprint(der),
        })
    }

    /// SHA-256 over the SPKI DER, colon-separated uppercase hex.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn bits(&self) -> usize {
        self.pss.size() * 8
    }

    /// RSASSA-PKCS1-v1_5 with SHA-256.
    pub fn verify_pkcs1(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(sig) = pkcs1v15::Signature::try_from(signature) else {
            return false;
        };
        self.pkcs1.verify(message, &sig).is_ok()
    }

    /// RSASSA-PSS with SHA-256 and MGF1-SHA-256, for one exact salt length.
    pub fn verify_pss(&self, message: &[u8], signature: &[u8], salt_len: usize) -> bool {
        let hashed = digest(&SHA256, message);
        self.pss
            .verify(Pss::new_with_salt::<Sha256>(salt_len), hashed.as_ref(), signature)
            .is_ok()
    }
}

fn extract_spki(cert_der: &[u8]) -> Result<Vec<u8>, String> {
    let (_, cert) =
        x509_parser::parse_x509_certificate(cert_der).map_err(|e| format!("x509 parse: {e}"))?;
    Ok(cert.tbs_certificate.subject_pki.raw.to_vec())
}

/// State of the verifier's public key after loading and import.
#[derive(Debug, Clone)]
pub enum KeyState {
    /// No key was configured, or it could not be fetched. Signatures are skipped.
    Absent,
    Ready(Arc<VerificationKey>),
    /// Key bytes were obtained but did not import. Signatures fail with this error.
    Invalid(CertError),
}

impl KeyState {
    /// Imports `pem`, logging the outcome.
    pub fn import(pem: &str) -> Self {
        match VerificationKey::from_pem(pem) {
            Ok(key) => {
                info!(fingerprint = %key.fingerprint(), bits = key.bits(), "public key imported");
                KeyState::Ready(Arc::new(key))
            }
            Err(err) => {
                warn!(error = %err, "public key import failed");
                KeyState::Invalid(err)
            }
        }
    }

    pub fn from_optional_pem(pem: Option<&str>) -> Self {
        pem.map(Self::import).unwrap_or(KeyState::Absent)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, KeyState::Ready(_))
    }
}

/// Where the public key PEM comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    Pem(String),
    Path(PathBuf),
    Url(String),
}

impl KeySource {
    /// Fetches the PEM text. I/O failures are returned, not logged.
    pub async fn fetch(&self) -> anyhow::Result<String> {
        match self {
            KeySource::Pem(pem) => Ok(pem.clone()),
            KeySource::Path(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("read {:?}", path)),
            KeySource::Url(url) => {
                debug!(%url, "fetching public key");
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(15))
                    .build()?;
                let response = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?
                    .error_for_status()?;
                let body = response.text().await?;
                if body.trim().is_empty() {
                    return Err(anyhow!("empty public key response from {url}"));
                }
                Ok(body)
            }
        }
    }

    /// Fetches and imports the key. A fetch failure means "no key", not an error.
    pub async fn load(&self) -> KeyState {
        match self.fetch().await {
            Ok(pem) => KeyState::import(&pem),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "public key unavailable; signature checks will be skipped");
                KeyState::Absent
            }
        }
    }
}

/// Loads the key from an optional source; `None` yields [`KeyState::Absent`].
pub async fn load_key(source: Option<&KeySource>) -> KeyState {
    match source {
        Some(source) => source.load().await,
        None => KeyState::Absent,
    }
}
