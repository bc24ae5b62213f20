use crate::certificate::errors::CertError;
use crate::certificate::util::has_value;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
/// A wipe certificate exactly as received: a JSON object with arbitrary fields.
///
/// Verification never mutates a document. Normalization and canonicalization
/// derive new values from it.
pub struct CertificateDocument {
    fields: Map<String, JsonValue>,
}

impl CertificateDocument {
    /// Parses UTF-8 JSON text; anything other than a top-level object is rejected.
    pub fn parse(text: &str) -> Result<Self, CertError> {
        let value: JsonValue =
            serde_json::from_str(text).map_err(|e| CertError::UnparsableJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wraps an already-parsed JSON value.
    pub fn from_value(value: JsonValue) -> Result<Self, CertError> {
        match value {
            JsonValue::Object(fields) => Ok(Self { fields }),
            other => Err(CertError::UnparsableJson(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(JsonValue::as_str)
    }

    /// True when `key` holds something other than `null` or an empty string.
    pub fn has(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(has_value)
    }

    pub fn to_value(&self) -> JsonValue {
        JsonValue::Object(self.fields.clone())
    }

    /// Returns a copy with `key` set to `value`; the receiver is untouched.
    pub(crate) fn with_field(&self, key: &str, value: JsonValue) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(key.to_string(), value);
        Self { fields }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Why a signature check was not attempted.
pub enum SkipReason {
    NoDocument,
    NoPublicKey,
    NoSignature,
}

impl SkipReason {
    /// The non-fatal error a skip stands for, if any.
    pub fn as_error(self) -> Option<CertError> {
        match self {
            SkipReason::NoDocument => None,
            SkipReason::NoPublicKey => Some(CertError::NoPublicKey),
            SkipReason::NoSignature => Some(CertError::NoSignature),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Text encoding a signature value was decoded from.
pub enum SignatureEncoding {
    Base64,
    Base64Url,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of the signature stage.
pub struct SignatureCheck {
    pub attempted: bool,
    pub ok: bool,
    /// Strategy that verified, e.g. `canonical+pss(salt=32)`.
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<SignatureEncoding>,
    /// Every strategy label tried, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<String>,
}

impl SignatureCheck {
    /// Not attempted. `error` carries the non-fatal error behind the skip.
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            attempted: false,
            ok: false,
            method: None,
            reason: Some(reason),
            error: reason.as_error().map(|err| err.to_string()),
            encoding: None,
            attempts: Vec::new(),
        }
    }

    pub fn errored(err: &CertError, attempts: Vec<String>) -> Self {
        Self {
            attempted: true,
            ok: false,
            method: None,
            reason: None,
            error: Some(err.to_string()),
            encoding: None,
            attempts,
        }
    }

    /// Attempted and did not verify, whether by mismatch or by error.
    pub fn failed(&self) -> bool {
        self.attempted && !self.ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashOutcome {
    Match,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A declared digest next to the one computed locally.
pub struct HashCheck {
    pub declared: String,
    pub computed: String,
    pub outcome: HashOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HashReport {
    #[serde(rename = "sha256Pdf", skip_serializing_if = "Option::is_none")]
    pub pdf: Option<HashCheck>,
    #[serde(rename = "sha256Json", skip_serializing_if = "Option::is_none")]
    pub json: Option<HashCheck>,
}

impl HashReport {
    pub fn any_mismatch(&self) -> bool {
        [&self.pdf, &self.json]
            .into_iter()
            .flatten()
            .any(|check| check.outcome == HashOutcome::Mismatch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Idle,
    Ok,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checks {
    pub hashes: HashReport,
    pub signature: SignatureCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// The only externally visible artifact of a verification.
pub struct Verdict {
    pub status: VerdictStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Checks>,
}

impl Verdict {
    pub fn idle() -> Self {
        Self {
            status: VerdictStatus::Idle,
            message: "no certificate supplied".into(),
            document: None,
            checks: None,
        }
    }

    pub fn error(err: &CertError) -> Self {
        Self {
            status: VerdictStatus::Error,
            message: err.to_string(),
            document: None,
            checks: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == VerdictStatus::Ok
    }
}
