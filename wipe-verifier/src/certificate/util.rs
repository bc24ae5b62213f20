use ring::digest::{digest, SHA256};
use serde_json::Value as JsonValue;

/// Formats a SHA-256 digest as uppercase colon-separated hex.
pub fn sha256_fingerprint(data: &[u8]) -> String {
    let d = digest(&SHA256, data);
    let mut out = String::with_capacity(d.as_ref().len() * 3);
    for (idx, byte) in d.as_ref().iter().enumerate() {
        if idx > 0 {
            out.push(':');
        }
        out.push_str(&format!("{:02X}", byte));
    }
    out
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data))
}

/// Case-insensitive hex comparison supporting optional `0x` prefixes.
pub fn eq_hex(a: &str, b: &str) -> bool {
    let na = a.trim().trim_start_matches("0x");
    let nb = b.trim().trim_start_matches("0x");
    na.eq_ignore_ascii_case(nb)
}

/// Presence test shared by alias matching and required-field checks.
pub fn has_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::String(s) => !s.is_empty(),
        _ => true,
    }
}
