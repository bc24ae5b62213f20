use crate::certificate::types::CertificateDocument;
use crate::certificate::util::has_value;
use serde_json::{Map, Value as JsonValue};
use tracing::trace;

/// Location of a candidate value inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Top(&'static str),
    /// `parent.child`, where `parent` must be an object.
    Nested(&'static str, &'static str),
}

impl FieldPath {
    fn resolve<'a>(&self, fields: &'a Map<String, JsonValue>) -> Option<&'a JsonValue> {
        let value = match *self {
            FieldPath::Top(key) => fields.get(key),
            FieldPath::Nested(parent, child) => fields
                .get(parent)
                .and_then(JsonValue::as_object)
                .and_then(|obj| obj.get(child)),
        };
        value.filter(|v| has_value(v))
    }
}

/// One canonical field and the alias paths that may fill it, in priority order.
#[derive(Debug)]
pub struct AliasRule {
    pub canonical: &'static str,
    pub candidates: &'static [FieldPath],
}

use FieldPath::{Nested, Top};

pub const ALIAS_RULES: &[AliasRule] = &[
    AliasRule {
        canonical: "certificateId",
        candidates: &[Top("certificate_id")],
    },
    AliasRule {
        canonical: "deviceId",
        candidates: &[
            Top("device_id"),
            Nested("device", "device_id"),
            Nested("device", "id"),
            Nested("device", "serial_number"),
            Nested("device", "serial"),
            Nested("drive", "serial_number"),
            Nested("drive", "serial"),
            Nested("drive", "sn"),
            Top("drive_serial_number"),
            Top("serial_number"),
            Top("sn"),
        ],
    },
    AliasRule {
        canonical: "wipedAt",
        candidates: &[Top("wiped_at"), Top("issued_on")],
    },
    AliasRule {
        canonical: "sha256Pdf",
        candidates: &[Top("sha256_pdf")],
    },
    AliasRule {
        canonical: "sha256Json",
        candidates: &[Top("sha256_json")],
    },
    AliasRule {
        canonical: "signature",
        candidates: &[Top("sig")],
    },
];

/// Copies alias values onto canonical field names.
///
/// Canonical fields that already hold a value are left alone, and aliases are
/// never removed. Missing fields simply stay missing.
pub fn normalize(document: &CertificateDocument) -> CertificateDocument {
    normalize_with(document, ALIAS_RULES)
}

pub fn normalize_with(document: &CertificateDocument, rules: &[AliasRule]) -> CertificateDocument {
    let mut out = document.clone();
    for rule in rules {
        if out.has(rule.canonical) {
            continue;
        }
        let found = rule
            .candidates
            .iter()
            .find_map(|path| path.resolve(document.fields()).map(|v| (path, v)));
        if let Some((path, value)) = found {
            trace!(canonical = rule.canonical, alias = ?path, "alias applied");
            out = out.with_field(rule.canonical, value.clone());
        }
    }
    out
}
