use crate::certificate::canonical::{canonical_bytes, SIGNATURE_FIELDS};
use crate::certificate::config::SignatureDecoding;
use crate::certificate::encoding::{decode_candidates, detect_signature};
use crate::certificate::errors::CertError;
use crate::certificate::keys::{KeyState, VerificationKey};
use crate::certificate::types::{CertificateDocument, SignatureCheck, SkipReason};
use crate::certificate::util::has_value;
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::debug;

/// Bytes a signature may have been produced over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVariant {
    /// Canonical document bytes without signature fields.
    Canonical,
    /// UTF-8 bytes of the document's `signedData` string, verbatim.
    SignedData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Pkcs1v15,
    Pss { salt_len: usize },
}

/// One (message variant, scheme, parameter) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub variant: MessageVariant,
    pub scheme: Scheme,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self.variant {
            MessageVariant::Canonical => "canonical",
            MessageVariant::SignedData => "signedData",
        };
        match self.scheme {
            Scheme::Pkcs1v15 => write!(f, "{variant}+pkcs1v15"),
            Scheme::Pss { salt_len } => write!(f, "{variant}+pss(salt={salt_len})"),
        }
    }
}

impl Strategy {
    fn verify(&self, key: &VerificationKey, message: &[u8], signature: &[u8]) -> bool {
        match self.scheme {
            Scheme::Pkcs1v15 => key.verify_pkcs1(message, signature),
            Scheme::Pss { salt_len } => key.verify_pss(message, signature, salt_len),
        }
    }
}

/// The ordered strategy list: PKCS#1 v1.5 then each PSS salt, over canonical
/// bytes and then, if the document has one, over `signedData`.
pub fn strategies(salt_lengths: &[usize], with_signed_data: bool) -> Vec<Strategy> {
    let variants: &[MessageVariant] = if with_signed_data {
        &[MessageVariant::Canonical, MessageVariant::SignedData]
    } else {
        &[MessageVariant::Canonical]
    };
    variants
        .iter()
        .flat_map(|&variant| {
            std::iter::once(Scheme::Pkcs1v15)
                .chain(salt_lengths.iter().map(|&salt_len| Scheme::Pss { salt_len }))
                .map(move |scheme| Strategy { variant, scheme })
        })
        .collect()
}

/// First signature-bearing field present, in priority order.
pub fn find_signature(doc: &CertificateDocument) -> Option<(&'static str, &JsonValue)> {
    SIGNATURE_FIELDS
        .iter()
        .find_map(|&name| doc.get(name).filter(|v| has_value(v)).map(|v| (name, v)))
}

/// Runs the signature stage with first-match decoding. Never returns an
/// error: every failure mode is folded into the returned [`SignatureCheck`].
pub fn check_signature(
    doc: Option<&CertificateDocument>,
    key: &KeyState,
    salt_lengths: &[usize],
) -> SignatureCheck {
    check_signature_with(doc, key, salt_lengths, SignatureDecoding::FirstMatch)
}

/// Runs the signature stage, decoding the signature per `decoding`.
pub fn check_signature_with(
    doc: Option<&CertificateDocument>,
    key: &KeyState,
    salt_lengths: &[usize],
    decoding: SignatureDecoding,
) -> SignatureCheck {
    let Some(doc) = doc else {
        return SignatureCheck::skipped(SkipReason::NoDocument);
    };
    let key = match key {
        KeyState::Absent => return SignatureCheck::skipped(SkipReason::NoPublicKey),
        KeyState::Ready(key) => Ok(key.as_ref()),
        KeyState::Invalid(err) => Err(err.clone()),
    };
    let Some((field, value)) = find_signature(doc) else {
        return SignatureCheck::skipped(SkipReason::NoSignature);
    };
    let key = match key {
        Ok(key) => key,
        Err(err) => return SignatureCheck::errored(&err, Vec::new()),
    };
    let Some(text) = value.as_str() else {
        debug!(field, "signature field is not a string");
        return SignatureCheck::errored(&CertError::UnsupportedSignatureEncoding, Vec::new());
    };
    let candidates = match decoding {
        SignatureDecoding::FirstMatch => match detect_signature(text) {
            Ok(decoded) => vec![decoded],
            Err(err) => return SignatureCheck::errored(&err, Vec::new()),
        },
        SignatureDecoding::AllCandidates => decode_candidates(text),
    };
    if candidates.is_empty() {
        return SignatureCheck::errored(&CertError::UnsupportedSignatureEncoding, Vec::new());
    }

    let canonical = canonical_bytes(doc.fields());
    let signed_data = doc.get_str("signedData");
    let plan = strategies(salt_lengths, signed_data.is_some());

    let mut attempts = Vec::new();
    for (encoding, sig) in &candidates {
        for strategy in &plan {
            let message = match strategy.variant {
                MessageVariant::Canonical => canonical.as_slice(),
                MessageVariant::SignedData => signed_data.unwrap_or_default().as_bytes(),
            };
            let label = strategy.to_string();
            let ok = strategy.verify(key, message, sig);
            debug!(field, encoding = encoding.as_str(), method = %label, ok, "signature attempt");
            attempts.push(label);
            if ok {
                return SignatureCheck {
                    attempted: true,
                    ok: true,
                    method: Some(strategy.to_string()),
                    reason: None,
                    error: None,
                    encoding: Some(*encoding),
                    attempts,
                };
            }
        }
    }

    // A single decoding is still worth reporting when nothing verified.
    let encoding = match candidates.as_slice() {
        [(encoding, _)] => Some(*encoding),
        _ => None,
    };
    SignatureCheck {
        attempted: true,
        ok: false,
        method: None,
        reason: None,
        error: None,
        encoding,
        attempts,
    }
}
