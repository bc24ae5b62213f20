use crate::certificate::keys::KeySource;
use serde::Deserialize;

/// PSS salt lengths tried in order: hash length, the legacy 20 bytes, then two
/// longer values seen in the wild.
pub const DEFAULT_PSS_SALT_LENGTHS: [usize; 4] = [32, 20, 48, 64];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How sub-check outcomes affect the verdict once required fields are present.
pub enum VerdictPolicy {
    /// Hash and signature outcomes are annotations only.
    #[default]
    Lenient,
    /// A hash mismatch or an attempted signature that did not verify fails the verdict.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How a signature string is turned into bytes before verification.
pub enum SignatureDecoding {
    /// Only the first of base64, base64url and hex that parses.
    #[default]
    FirstMatch,
    /// Every distinct decoding, in priority order, each against the full
    /// strategy list. Accepts plain hex that also happens to parse as base64.
    AllCandidates,
}

#[derive(Debug, Clone)]
/// Parameters that drive signature verification and verdict assembly.
pub struct VerifierConfig {
    pub policy: VerdictPolicy,
    pub pss_salt_lengths: Vec<usize>,
    pub signature_decoding: SignatureDecoding,
    /// Where to load the public key from; `None` skips signature checks.
    pub key_source: Option<KeySource>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            policy: VerdictPolicy::Lenient,
            pss_salt_lengths: DEFAULT_PSS_SALT_LENGTHS.to_vec(),
            signature_decoding: SignatureDecoding::FirstMatch,
            key_source: None,
        }
    }
}

impl VerifierConfig {
    pub fn strict(mut self) -> Self {
        self.policy = VerdictPolicy::Strict;
        self
    }

    pub fn try_all_encodings(mut self) -> Self {
        self.signature_decoding = SignatureDecoding::AllCandidates;
        self
    }

    pub fn with_key_source(mut self, source: KeySource) -> Self {
        self.key_source = Some(source);
        self
    }
}
