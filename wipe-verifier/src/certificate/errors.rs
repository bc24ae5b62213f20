use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Error taxonomy for certificate verification.
///
/// Only `MissingRequiredField` and `UnparsableJson` end a verdict. The
/// cryptographic variants are caught at the signature boundary and kept as data.
pub enum CertError {
    #[error("missing required field: {0}")]
    MissingRequiredField(String),
    #[error("signature is not base64, base64url or hex")]
    UnsupportedSignatureEncoding,
    #[error("invalid JSON: {0}")]
    UnparsableJson(String),
    #[error("public key import failed: {0}")]
    KeyImport(String),
    #[error("no signature present")]
    NoSignature,
    #[error("no public key available")]
    NoPublicKey,
    #[error("internal: {0}")]
    Internal(String),
}
