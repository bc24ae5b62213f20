use crate::certificate::config::VerdictPolicy;
use crate::certificate::errors::CertError;
use crate::certificate::signature::find_signature;
use crate::certificate::types::{
    CertificateDocument, Checks, HashCheck, HashOutcome, HashReport, SignatureCheck, SkipReason,
    Verdict, VerdictStatus,
};

/// Fields that must be present after normalization, checked in this order.
pub const REQUIRED_FIELDS: [&str; 3] = ["certificateId", "deviceId", "wipedAt"];

/// Reports the first missing required field.
pub fn check_required(normalized: &CertificateDocument) -> Result<(), CertError> {
    match REQUIRED_FIELDS.iter().find(|f| !normalized.has(f)) {
        Some(field) => Err(CertError::MissingRequiredField((*field).to_string())),
        None => Ok(()),
    }
}

/// Verdict for a document that failed the required-field check.
pub fn missing_field(original: &CertificateDocument, err: &CertError) -> Verdict {
    Verdict {
        status: VerdictStatus::Fail,
        message: err.to_string(),
        document: Some(original.to_value()),
        checks: None,
    }
}

/// Combines hash and signature outcomes into a verdict for a structurally
/// valid document.
pub fn assemble(
    original: &CertificateDocument,
    hashes: HashReport,
    signature: SignatureCheck,
    policy: VerdictPolicy,
) -> Verdict {
    let mut notes = Vec::new();
    if let Some(check) = &hashes.pdf {
        notes.push(hash_note("sha256Pdf", check));
    }
    if let Some(check) = &hashes.json {
        notes.push(hash_note("sha256Json", check));
    }
    let has_signature = find_signature(original).is_some();
    if let Some(note) = signature_note(&signature, has_signature) {
        notes.push(note);
    }

    let failed = match policy {
        VerdictPolicy::Lenient => false,
        VerdictPolicy::Strict => hashes.any_mismatch() || signature.failed(),
    };
    let (status, headline) = if failed {
        (VerdictStatus::Fail, "Certificate invalid")
    } else {
        (VerdictStatus::Ok, "Certificate valid")
    };
    let message = if notes.is_empty() {
        headline.to_string()
    } else {
        format!("{headline} ({})", notes.join("; "))
    };

    Verdict {
        status,
        message,
        document: Some(original.to_value()),
        checks: Some(Checks { hashes, signature }),
    }
}

fn hash_note(field: &str, check: &HashCheck) -> String {
    match check.outcome {
        HashOutcome::Match => format!("{field}: match"),
        HashOutcome::Mismatch => format!("{field}: mismatch"),
    }
}

fn signature_note(check: &SignatureCheck, has_signature: bool) -> Option<String> {
    if !check.attempted {
        return match check.reason {
            Some(SkipReason::NoPublicKey) if has_signature => {
                Some(format!("signature: not checked, {}", CertError::NoPublicKey))
            }
            _ => None,
        };
    }
    Some(match (&check.method, &check.error) {
        (Some(method), _) => format!("signature: verified via {method}"),
        (None, Some(err)) => format!("signature: error, {err}"),
        (None, None) => "signature: not verified".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> CertificateDocument {
        CertificateDocument::from_value(value).unwrap()
    }

    fn failed_signature() -> SignatureCheck {
        SignatureCheck {
            attempted: true,
            ok: false,
            method: None,
            reason: None,
            error: None,
            encoding: None,
            attempts: vec!["canonical+pkcs1v15".into()],
        }
    }

    #[test]
    fn missing_fields_reported_in_fixed_order() {
        let err = check_required(&doc(json!({ "certificateId": "c1" }))).unwrap_err();
        assert_eq!(err, CertError::MissingRequiredField("deviceId".into()));
        let err = check_required(&doc(json!({}))).unwrap_err();
        assert_eq!(err, CertError::MissingRequiredField("certificateId".into()));
        let err = check_required(&doc(json!({ "certificateId": "c", "deviceId": "d", "wipedAt": "" })))
            .unwrap_err();
        assert_eq!(err, CertError::MissingRequiredField("wipedAt".into()));
    }

    #[test]
    fn lenient_policy_annotates_failures() {
        let d = doc(json!({}));
        let v = assemble(&d, HashReport::default(), failed_signature(), VerdictPolicy::Lenient);
        assert_eq!(v.status, VerdictStatus::Ok);
        assert_eq!(v.message, "Certificate valid (signature: not verified)");
    }

    #[test]
    fn strict_policy_fails_on_attempted_signature_failure() {
        let d = doc(json!({}));
        let v = assemble(&d, HashReport::default(), failed_signature(), VerdictPolicy::Strict);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert!(v.message.starts_with("Certificate invalid"));
    }

    #[test]
    fn strict_policy_ignores_skipped_signature() {
        let d = doc(json!({}));
        let skipped = SignatureCheck::skipped(SkipReason::NoSignature);
        let v = assemble(&d, HashReport::default(), skipped, VerdictPolicy::Strict);
        assert_eq!(v.status, VerdictStatus::Ok);
        assert_eq!(v.message, "Certificate valid");
    }

    #[test]
    fn strict_policy_fails_on_hash_mismatch() {
        let d = doc(json!({}));
        let hashes = HashReport {
            pdf: Some(HashCheck {
                declared: "00".into(),
                computed: "11".into(),
                outcome: HashOutcome::Mismatch,
            }),
            json: None,
        };
        let skipped = SignatureCheck::skipped(SkipReason::NoSignature);
        let v = assemble(&d, hashes.clone(), skipped.clone(), VerdictPolicy::Strict);
        assert_eq!(v.status, VerdictStatus::Fail);
        let v = assemble(&d, hashes, skipped, VerdictPolicy::Lenient);
        assert_eq!(v.message, "Certificate valid (sha256Pdf: mismatch)");
    }

    #[test]
    fn missing_public_key_is_noted_only_for_signed_documents() {
        let skipped = SignatureCheck::skipped(SkipReason::NoPublicKey);
        let signed = doc(json!({ "sig": "AAAA" }));
        let v = assemble(&signed, HashReport::default(), skipped.clone(), VerdictPolicy::Lenient);
        assert_eq!(v.message, "Certificate valid (signature: not checked, no public key available)");
        let unsigned = doc(json!({}));
        let v = assemble(&unsigned, HashReport::default(), skipped, VerdictPolicy::Lenient);
        assert_eq!(v.message, "Certificate valid");
    }
}
