#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer};
use rsa::{pkcs1v15, pss, RsaPrivateKey};
use serde_json::Value as JsonValue;
use sha2::Sha256;
use std::path::PathBuf;
use std::sync::OnceLock;
use wipe_verifier::certificate::{canonical_bytes, CertificateDocument};

/// One 2048-bit key per test binary; generation is slow in debug builds.
pub fn signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 2048).expect("generate RSA key")
    })
}

pub fn public_key_pem() -> String {
    signing_key()
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode public key")
}

pub fn sign_pkcs1(message: &[u8]) -> Vec<u8> {
    let signer = pkcs1v15::SigningKey::<Sha256>::new(signing_key().clone());
    signer.sign(message).to_vec()
}

pub fn sign_pss(message: &[u8], salt_len: usize) -> Vec<u8> {
    let signer = pss::SigningKey::<Sha256>::new_with_salt_len(signing_key().clone(), salt_len);
    let mut rng = rand::thread_rng();
    signer.sign_with_rng(&mut rng, message).to_vec()
}

/// Canonical bytes of `doc` as the engine computes them.
pub fn canonical(doc: &JsonValue) -> Vec<u8> {
    let doc = CertificateDocument::from_value(doc.clone()).expect("object");
    canonical_bytes(doc.fields())
}

/// Returns `doc` with `field` set to `signature` encoded as standard base64.
pub fn with_signature(doc: &JsonValue, field: &str, signature: &[u8]) -> JsonValue {
    with_field(doc, field, JsonValue::from(b64.encode(signature)))
}

pub fn with_field(doc: &JsonValue, field: &str, value: JsonValue) -> JsonValue {
    let mut doc = doc.clone();
    doc.as_object_mut()
        .expect("object")
        .insert(field.to_string(), value);
    doc
}

pub fn base_document() -> JsonValue {
    serde_json::json!({
        "certificateId": "c1",
        "deviceId": "d1",
        "wipedAt": "2024-01-01T00:00:00Z"
    })
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("read fixture")
}
