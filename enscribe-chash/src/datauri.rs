//! Data-URL payloads.
//!
//! ```text
//! payload = varint(mime.len) || mime || data
//! ```
//!
//! Three MIME types have short keys with native values: `text` and `html`
//! decode to strings, `json` decodes to a JSON value. Everything else renders
//! as `data:<mime>;base64,<data>`.

use data_encoding::BASE64;
use serde_json::Value;

use enscribe_core::bytes::utf8_from_bytes;
use enscribe_core::error::{EnscribeError, Result};

/// A MIME type with an ergonomic entry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShortKey {
    /// Entry key.
    pub key: &'static str,
    /// MIME type.
    pub mime: &'static str,
}

/// Short keys in lookup order.
pub const SHORT_KEYS: [ShortKey; 3] = [
    ShortKey { key: "text", mime: "text/plain" },
    ShortKey { key: "html", mime: "text/html" },
    ShortKey { key: "json", mime: "application/json" },
];

impl ShortKey {
    /// Finds a short key by entry key.
    pub fn by_key(key: &str) -> Option<ShortKey> {
        SHORT_KEYS.iter().copied().find(|s| s.key == key)
    }

    /// Finds a short key by MIME type.
    pub fn by_mime(mime: &str) -> Option<ShortKey> {
        SHORT_KEYS.iter().copied().find(|s| s.mime == mime)
    }

    fn is_json(&self) -> bool {
        self.key == "json"
    }

    /// Decodes content bytes into the native value.
    pub fn decode(&self, data: &[u8]) -> Result<Value> {
        if self.is_json() {
            Ok(serde_json::from_slice(data)?)
        } else {
            Ok(Value::String(utf8_from_bytes(data)?))
        }
    }

    /// Encodes a native value into content bytes.
    ///
    /// `json` accepts any value; `text` and `html` require a string.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        if self.is_json() {
            return Ok(serde_json::to_vec(value)?);
        }
        match value {
            Value::String(s) => Ok(s.as_bytes().to_vec()),
            other => Err(EnscribeError::Format(format!(
                "expected string for {}: {other}",
                self.key
            ))),
        }
    }
}

/// Builds a data-URL payload.
pub fn encode_payload(mime: &str, data: &[u8]) -> Vec<u8> {
    let mut buf = unsigned_varint::encode::usize_buffer();
    let len = unsigned_varint::encode::usize(mime.len(), &mut buf);
    let mut v = Vec::with_capacity(len.len() + mime.len() + data.len());
    v.extend_from_slice(len);
    v.extend_from_slice(mime.as_bytes());
    v.extend_from_slice(data);
    v
}

/// Splits a data-URL payload into MIME type and content.
pub fn decode_payload(v: &[u8]) -> Result<(String, &[u8])> {
    let (len, rest) = unsigned_varint::decode::usize(v)
        .map_err(|e| EnscribeError::MalformedEnvelope(format!("mime length: {e}")))?;
    if rest.len() < len {
        return Err(EnscribeError::MalformedEnvelope(format!(
            "mime truncated: expected {len} bytes, got {}",
            rest.len()
        )));
    }
    let (mime, data) = rest.split_at(len);
    Ok((utf8_from_bytes(mime)?, data))
}

/// Renders `data:<mime>;base64,<data>`.
pub fn to_url(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(data))
}

/// Parses a `data:` URL into MIME type and content.
///
/// Only the base64 form decodes its body; otherwise the body is taken as raw
/// UTF-8. Parameters other than `base64` stay part of the MIME type.
pub fn parse_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| EnscribeError::Format(format!("expected data: URL: {url}")))?;
    let (header, body) = rest
        .split_once(',')
        .ok_or_else(|| EnscribeError::Format(format!("expected comma in data: URL: {url}")))?;
    match header.strip_suffix(";base64") {
        Some(mime) => {
            let data = BASE64
                .decode(body.as_bytes())
                .map_err(|e| EnscribeError::Format(format!("data: URL body: {e}")))?;
            Ok((mime.to_string(), data))
        }
        None => Ok((header.to_string(), body.as_bytes().to_vec())),
    }
}
