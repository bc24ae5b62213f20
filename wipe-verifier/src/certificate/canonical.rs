use serde_json::{Map, Value as JsonValue};

/// Fields that may carry a signature; never part of the signed content.
pub const SIGNATURE_FIELDS: [&str; 4] = ["signature", "sig", "digital_signature", "digitalSignature"];

/// Serializes `fields` without the top-level `exclude` keys, with object keys
/// sorted by byte value at every depth and no insignificant whitespace.
///
/// Key sorting is done here rather than relying on the map type, so the
/// output does not depend on serde_json's `preserve_order` feature.
///
/// Numbers are written the way `serde_json` prints them: `1.0` stays `1.0`
/// and integers beyond `u64`/`i64` become floats such as `1e20`. A producer
/// that prints `1` or the full digits signs different bytes, so signatures
/// over such documents do not verify.
pub fn canonicalize(fields: &Map<String, JsonValue>, exclude: &[&str]) -> Vec<u8> {
    let mut out = String::new();
    let mut keys: Vec<&String> = fields
        .keys()
        .filter(|k| !exclude.contains(&k.as_str()))
        .collect();
    keys.sort();
    write_object(&mut out, keys.into_iter().map(|k| (k, &fields[k.as_str()])));
    out.into_bytes()
}

/// Canonical bytes with every signature-bearing field removed.
pub fn canonical_bytes(fields: &Map<String, JsonValue>) -> Vec<u8> {
    canonicalize(fields, &SIGNATURE_FIELDS)
}

fn write_value(out: &mut String, value: &JsonValue) {
    match value {
        JsonValue::Object(map) => {
            let mut entries: Vec<(&String, &JsonValue)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            write_object(out, entries.into_iter());
        }
        JsonValue::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_object<'a>(out: &mut String, entries: impl Iterator<Item = (&'a String, &'a JsonValue)>) {
    out.push('{');
    for (idx, (key, value)) in entries.enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&JsonValue::from(key.as_str()).to_string());
        out.push(':');
        write_value(out, value);
    }
    out.push('}');
}
