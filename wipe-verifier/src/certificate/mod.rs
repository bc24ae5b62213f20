pub mod canonical;
pub mod config;
pub mod digest;
pub mod encoding;
pub mod errors;
pub mod keys;
pub mod normalize;
pub mod signature;
pub mod types;
pub mod verdict;
pub mod verifier;

mod util;

pub use canonical::{canonical_bytes, canonicalize, SIGNATURE_FIELDS};
pub use config::{SignatureDecoding, VerdictPolicy, VerifierConfig, DEFAULT_PSS_SALT_LENGTHS};
pub use digest::Artifact;
pub use encoding::{decode_candidates, decode_signature, detect_signature};
pub use errors::CertError;
pub use keys::{KeySource, KeyState, VerificationKey};
pub use normalize::normalize;
pub use signature::{check_signature, check_signature_with};
pub use types::{
    CertificateDocument, HashOutcome, HashReport, SignatureCheck, SignatureEncoding, SkipReason,
    Verdict, VerdictStatus,
};
pub use verifier::Verifier;
