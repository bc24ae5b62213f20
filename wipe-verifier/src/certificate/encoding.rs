use crate::certificate::errors::CertError;
use crate::certificate::types::SignatureEncoding;
use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;

impl SignatureEncoding {
    /// Order in which decoders are tried.
    pub const PRIORITY: [SignatureEncoding; 3] = [
        SignatureEncoding::Base64,
        SignatureEncoding::Base64Url,
        SignatureEncoding::Hex,
    ];

    /// Decodes `text`, or `None` if it does not parse in this encoding.
    pub fn decode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            SignatureEncoding::Base64 => b64.decode(text.as_bytes()).ok(),
            SignatureEncoding::Base64Url => decode_base64url(text),
            SignatureEncoding::Hex => decode_hex(text),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignatureEncoding::Base64 => "base64",
            SignatureEncoding::Base64Url => "base64url",
            SignatureEncoding::Hex => "hex",
        }
    }
}

/// Decodes a signature with the first encoding that parses.
///
/// Priority is strict: unprefixed hex whose length is a multiple of four is
/// usually valid base64 too, and is then read as base64.
pub fn decode_signature(text: &str) -> Result<Vec<u8>, CertError> {
    detect_signature(text).map(|(_, bytes)| bytes)
}

/// Like [`decode_signature`], also reporting which encoding matched.
pub fn detect_signature(text: &str) -> Result<(SignatureEncoding, Vec<u8>), CertError> {
    let text = text.trim();
    SignatureEncoding::PRIORITY
        .into_iter()
        .find_map(|enc| enc.decode(text).map(|bytes| (enc, bytes)))
        .ok_or(CertError::UnsupportedSignatureEncoding)
}

/// Every distinct decoding of `text` that parses, in priority order.
pub fn decode_candidates(text: &str) -> Vec<(SignatureEncoding, Vec<u8>)> {
    let text = text.trim();
    let mut out: Vec<(SignatureEncoding, Vec<u8>)> = Vec::new();
    for enc in SignatureEncoding::PRIORITY {
        if let Some(bytes) = enc.decode(text) {
            if !out.iter().any(|(_, seen)| seen == &bytes) {
                out.push((enc, bytes));
            }
        }
    }
    out
}

fn decode_base64url(text: &str) -> Option<Vec<u8>> {
    let mut s: String = text
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while s.len() % 4 != 0 {
        s.push('=');
    }
    b64.decode(s.as_bytes()).ok()
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let body = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        return None;
    }
    hex::decode(compact).ok()
}
