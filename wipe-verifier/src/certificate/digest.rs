use crate::certificate::canonical::{canonicalize, SIGNATURE_FIELDS};
use crate::certificate::types::{CertificateDocument, HashCheck, HashOutcome, HashReport};
use crate::certificate::util::{eq_hex, sha256_hex};
use serde_json::Value as JsonValue;

/// Fields excluded from the bytes that `sha256Json` is computed over.
///
/// A document cannot contain its own digest, so the digest fields themselves
/// are left out together with the signature fields.
pub const JSON_DIGEST_EXCLUDED: [&str; 6] = [
    SIGNATURE_FIELDS[0],
    SIGNATURE_FIELDS[1],
    SIGNATURE_FIELDS[2],
    SIGNATURE_FIELDS[3],
    "sha256Json",
    "sha256_json",
];

/// The uploaded artifact the certificate's `sha256Pdf` refers to.
#[derive(Debug, Clone)]
pub enum Artifact {
    Bytes(Vec<u8>),
    /// Digest already computed by the caller (hex).
    Sha256(String),
}

impl Artifact {
    pub fn sha256_hex(&self) -> String {
        match self {
            Artifact::Bytes(bytes) => sha256_hex(bytes),
            Artifact::Sha256(hex) => hex.trim().to_ascii_lowercase(),
        }
    }
}

/// Compares declared digests against computed ones.
///
/// `normalized` supplies the declared values (so alias spellings count);
/// `original` is what gets canonicalized for `sha256Json`.
pub fn check_hashes(
    original: &CertificateDocument,
    normalized: &CertificateDocument,
    artifact: Option<&Artifact>,
) -> HashReport {
    let pdf = match (declared(normalized, "sha256Pdf"), artifact) {
        (Some(declared), Some(artifact)) => Some(compare(declared, artifact.sha256_hex())),
        _ => None,
    };
    let json = declared(normalized, "sha256Json").map(|declared| {
        let bytes = canonicalize(original.fields(), &JSON_DIGEST_EXCLUDED);
        compare(declared, sha256_hex(&bytes))
    });
    HashReport { pdf, json }
}

fn declared(doc: &CertificateDocument, field: &str) -> Option<String> {
    if !doc.has(field) {
        return None;
    }
    doc.get(field).map(|value| match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn compare(declared: String, computed: String) -> HashCheck {
    let outcome = if eq_hex(&declared, &computed) {
        HashOutcome::Match
    } else {
        HashOutcome::Mismatch
    };
    HashCheck {
        declared,
        computed,
        outcome,
    }
}
