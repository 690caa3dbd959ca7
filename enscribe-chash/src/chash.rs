//! The content-hash envelope.

use std::fmt;

use serde_json::{json, Value};
use tracing::debug;

use enscribe_core::bytes::{bytes_from_value, is_samecase_phex, phex_from_bytes};
use enscribe_core::error::{EnscribeError, Result};

use crate::datauri::{self, ShortKey};
use crate::protocol::{parse_onion, split_url, Protocol, KEY_ONION, ONION_SUFFIX};

/// A content hash: `varint(codec) || payload`.
///
/// Every constructor validates the codec and the payload, so rendering a
/// constructed value only fails on internal inconsistency.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: Vec<u8>,
    protocol: Protocol,
    offset: usize,
}

impl ContentHash {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONSTRUCTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Assembles an envelope from a protocol and its payload.
    pub fn from_parts(protocol: Protocol, payload: &[u8]) -> Result<ContentHash> {
        protocol.validate(payload)?;
        let mut buf = unsigned_varint::encode::u64_buffer();
        let prefix = unsigned_varint::encode::u64(protocol.codec(), &mut buf);
        let mut bytes = Vec::with_capacity(prefix.len() + payload.len());
        bytes.extend_from_slice(prefix);
        bytes.extend_from_slice(payload);
        Ok(ContentHash {
            bytes,
            protocol,
            offset: prefix.len(),
        })
    }

    /// Assembles an envelope from a numeric codec and its payload.
    pub fn from_codec(codec: u64, payload: &[u8]) -> Result<ContentHash> {
        let protocol = Protocol::from_codec(codec).ok_or(EnscribeError::UnknownCodec(codec))?;
        Self::from_parts(protocol, payload)
    }

    /// Parses an existing envelope.
    pub fn from_bytes(v: &[u8]) -> Result<ContentHash> {
        let (codec, payload) = unsigned_varint::decode::u64(v)
            .map_err(|e| EnscribeError::MalformedEnvelope(format!("codec varint: {e}")))?;
        Self::from_codec(codec, payload)
    }

    /// Parses a same-case `0x` hex envelope.
    pub fn from_phex(s: &str) -> Result<ContentHash> {
        Self::from_bytes(&enscribe_core::bytes::bytes_from_phex(s)?)
    }

    /// Parses an onion address without its `.onion` suffix.
    pub fn from_onion(hash: &str) -> Result<ContentHash> {
        let (protocol, payload) = parse_onion(hash)?;
        Self::from_parts(protocol, &payload)
    }

    /// Builds a v3 onion content hash from a 32-byte ed25519 public key.
    pub fn from_onion_pubkey(pubkey: &[u8], version: u8) -> Result<ContentHash> {
        let payload = crate::protocol::onion_from_pubkey(pubkey, version)?;
        Self::from_parts(Protocol::Onion, &payload)
    }

    /// Builds a data-URL content hash.
    pub fn from_data(mime: &str, data: &[u8]) -> Result<ContentHash> {
        Self::from_parts(Protocol::DataUrl, &datauri::encode_payload(mime, data))
    }

    /// Parses a URL.
    ///
    /// `data:` URLs and known schemes map to their protocol, `http://<hash>.onion`
    /// maps to onion, and anything else with a scheme is stored as a generic URL.
    pub fn from_url(url: &str) -> Result<ContentHash> {
        if url.starts_with("data:") {
            let (mime, data) = datauri::parse_url(url)?;
            return Self::from_data(&mime, &data);
        }
        let parts = split_url(url)?;
        if let Some(protocol) = Protocol::from_scheme(parts.scheme) {
            return Self::from_parts(protocol, &protocol.parse_hash(parts.authority)?);
        }
        if parts.scheme == "http" {
            if let Some(hash) = parts.authority.strip_suffix(ONION_SUFFIX) {
                return Self::from_onion(hash);
            }
        }
        Self::from_parts(Protocol::GenericUrl, url.as_bytes())
    }

    /// Builds a content hash from a `(key, value)` entry.
    ///
    /// The key is tried, in order, as a scheme, a data-URL short key, a MIME
    /// type (contains `/`), and `onion`. Any other key falls back to the
    /// shape of the value.
    pub fn from_entry(key: &str, value: &Value) -> Result<ContentHash> {
        let as_str = || {
            value
                .as_str()
                .ok_or_else(|| EnscribeError::Format(format!("expected string for {key}: {value}")))
        };
        if let Some(protocol) = Protocol::from_scheme(key) {
            return Self::from_parts(protocol, &protocol.parse_hash(as_str()?)?);
        }
        if let Some(short) = ShortKey::by_key(key) {
            return Self::from_data(short.mime, &short.encode(value)?);
        }
        if key.contains('/') {
            return Self::from_data(key, as_str()?.as_bytes());
        }
        if key == KEY_ONION {
            return Self::from_onion(as_str()?);
        }
        debug!(key, "Content hash key is not a hint");
        Self::from_value(value)
    }

    /// Builds a content hash from a value's shape: a same-case hex string or a
    /// byte array is an envelope, any other string is a URL.
    pub fn from_value(value: &Value) -> Result<ContentHash> {
        match value {
            Value::String(s) if is_samecase_phex(s) => Self::from_phex(s),
            Value::String(s) => Self::from_url(s),
            Value::Array(_) => Self::from_bytes(&bytes_from_value(value)?),
            other => Err(EnscribeError::Format(format!("expected content hash: {other}"))),
        }
    }

    /// General entry point: a non-empty hint routes through [`from_entry`](Self::from_entry),
    /// otherwise the value's shape decides.
    pub fn from(value: &Value, hint: Option<&str>) -> Result<ContentHash> {
        match hint {
            Some(hint) if !hint.is_empty() => Self::from_entry(hint, value),
            _ => Self::from_value(value),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The full envelope.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The envelope codec.
    pub fn codec(&self) -> u64 {
        self.protocol.codec()
    }

    /// The protocol selected by the codec.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// The payload after the codec varint.
    pub fn data(&self) -> &[u8] {
        &self.bytes[self.offset..]
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RENDERING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Protocol-native hash.
    pub fn to_hash(&self) -> Result<String> {
        self.protocol.to_hash(self.data())
    }

    /// URL form.
    pub fn to_url(&self) -> Result<String> {
        self.protocol.to_url(self.data())
    }

    /// Short `(key, value)` entry.
    pub fn to_entry(&self) -> Result<(String, Value)> {
        self.protocol.to_entry(self.data())
    }

    /// Gateway URL, or the plain URL when the protocol has no gateway.
    pub fn to_gateway_url(&self) -> Result<String> {
        match self.protocol.gateway(&self.to_hash()?) {
            Some(url) => Ok(url),
            None => self.to_url(),
        }
    }

    /// Envelope as `0x` hex.
    pub fn to_phex(&self) -> String {
        phex_from_bytes(&self.bytes)
    }

    /// Structured description: `{protocol: {codec, name}, url, ...}`.
    pub fn to_object(&self) -> Result<Value> {
        let mut obj = self.protocol.to_object(self.data())?;
        obj["protocol"] = json!({
            "codec": self.codec(),
            "name": self.protocol.name(),
        });
        obj["url"] = json!(self.to_url()?);
        Ok(obj)
    }

    /// JSON form: the URL.
    pub fn to_json(&self) -> Result<Value> {
        Ok(Value::String(self.to_url()?))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}, {})", self.protocol.name(), self.to_phex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_url() {
            Ok(url) => f.write_str(&url),
            Err(_) => f.write_str(&self.to_phex()),
        }
    }
}

impl TryFrom<&[u8]> for ContentHash {
    type Error = EnscribeError;

    fn try_from(v: &[u8]) -> Result<Self> {
        Self::from_bytes(v)
    }
}

impl std::str::FromStr for ContentHash {
    type Err = EnscribeError;

    /// Parses a URL, or an envelope if the input is same-case hex.
    fn from_str(s: &str) -> Result<Self> {
        if is_samecase_phex(s) {
            Self::from_phex(s)
        } else {
            Self::from_url(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    const IPFS_RAW: &str = "0xe301017012201687de19f1516b9e560ab8655faa678e3a023ebff43494ac06a36581aafc957e";
    const IPFS_HASH: &str = "k2jmtxrxbr58aa3716vvr99qallufj3qae595op83p37jod4exujup32";
    const IPNS_RAW: &str = "0xe5010172002408011220c8a700c79100ff6d34c1be3d75729da863dbd4a86ec54b5347aaf9b88c4d137d";
    const IPNS_HASH: &str = "k51qzi5uqu5dl6mkhgsua6663hpyb7zs8qjh5blic33j5393iie8abot6jydfh";

    #[test]
    fn test_ipfs_fixture() {
        let ch = ContentHash::from_phex(IPFS_RAW).unwrap();
        let url = format!("ipfs://{IPFS_HASH}");
        assert_eq!(ch.protocol(), Protocol::Ipfs);
        assert_eq!(ch.to_hash().unwrap(), IPFS_HASH);
        assert_eq!(ch.to_url().unwrap(), url);
        assert_eq!(ch.to_phex(), IPFS_RAW);
        assert_eq!(ch.to_entry().unwrap(), ("ipfs".into(), json!(IPFS_HASH)));
        assert_eq!(
            ch.to_gateway_url().unwrap(),
            format!("https://cloudflare-ipfs.com/ipfs/{IPFS_HASH}")
        );

        assert_eq!(ContentHash::from(&json!(IPFS_HASH), Some("ipfs")).unwrap(), ch);
        assert_eq!(ContentHash::from_codec(0xE3, ch.data()).unwrap(), ch);
        assert_eq!(ContentHash::from_url(&url).unwrap(), ch);
    }

    #[test]
    fn test_ipns_fixture() {
        let ch = ContentHash::from_phex(IPNS_RAW).unwrap();
        assert_eq!(ch.to_hash().unwrap(), IPNS_HASH);
        assert_eq!(ch.to_gateway_url().unwrap(), format!("https://{IPNS_HASH}.ipfs2.eth.limo"));
        assert_eq!(ContentHash::from_url(&format!("ipns://{IPNS_HASH}")).unwrap(), ch);
    }

    #[test_case("ipfs://QmZcH4YvBVVRJtdn4RdbaqgspFU8gH6P9vomDpBVpAL3u4", Protocol::Ipfs)]
    #[test_case("ar://yBYkngZXGCQgYU-nUCwo5vns2ALUU0LXXZrCUlUUWkk", Protocol::Arweave)]
    #[test_case("http://2gzyxa5ihm7nsggfxnu52rck2vv4rvmdlkiu3zzui5du4xyclen53wid.onion", Protocol::Onion)]
    #[test_case("http://expyuzz4wqqyqhjn.onion", Protocol::OnionLegacy)]
    #[test_case("https://example.com/a?b=c", Protocol::GenericUrl)]
    #[test_case("data:image/png;base64,AQID", Protocol::DataUrl)]
    fn test_url_roundtrip(url: &str, protocol: Protocol) {
        let ch = ContentHash::from_url(url).unwrap();
        assert_eq!(ch.protocol(), protocol);
        let again = ContentHash::from_url(&ch.to_url().unwrap()).unwrap();
        assert_eq!(again.bytes(), ch.bytes());
        assert_eq!(ContentHash::from_phex(&ch.to_phex()).unwrap().bytes(), ch.bytes());
    }

    #[test]
    fn test_short_data_keys() {
        let ch = ContentHash::from_entry("text", &json!("hello")).unwrap();
        assert_eq!(ch.protocol(), Protocol::DataUrl);
        assert_eq!(ch.to_entry().unwrap(), ("text".into(), json!("hello")));
        assert_eq!(ch.to_url().unwrap(), "data:text/plain;base64,aGVsbG8=");

        let ch = ContentHash::from_entry("json", &json!({"a": 1})).unwrap();
        assert_eq!(ch.to_entry().unwrap(), ("json".into(), json!({"a": 1})));
        assert_eq!(ch.to_object().unwrap()["json"], json!({"a": 1}));

        let ch = ContentHash::from_entry("image/svg+xml", &json!("<svg/>")).unwrap();
        let (key, value) = ch.to_entry().unwrap();
        assert_eq!(key, "contenthash");
        assert_eq!(ContentHash::from_entry(&key, &value).unwrap(), ch);
    }

    #[test]
    fn test_onion_entry() {
        let ch = ContentHash::from_entry("onion", &json!("expyuzz4wqqyqhjn")).unwrap();
        assert_eq!(ch.to_gateway_url().unwrap(), "https://expyuzz4wqqyqhjn.onion.to");
        let ch = ContentHash::from_onion("2gzyxa5ihm7nsggfxnu52rck2vv4rvmdlkiu3zzui5du4xyclen53wid").unwrap();
        let pubkey = ch.data()[..32].to_vec();
        assert_eq!(ContentHash::from_onion_pubkey(&pubkey, 3).unwrap(), ch);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            ContentHash::from_bytes(&[0x99, 0x01]),
            Err(EnscribeError::UnknownCodec(0x99))
        ));
        assert!(matches!(
            ContentHash::from_bytes(&[0xff]),
            Err(EnscribeError::MalformedEnvelope(_))
        ));
        assert!(matches!(ContentHash::from_url("no-scheme"), Err(EnscribeError::Format(_))));
        assert!(ContentHash::from_value(&json!(1)).is_err());
        assert!(ContentHash::from_entry("ipfs", &json!(1)).is_err());
    }

    #[test]
    fn test_to_object() {
        let obj = ContentHash::from_phex(IPFS_RAW).unwrap().to_object().unwrap();
        assert_eq!(obj["protocol"]["codec"], json!(0xE3));
        assert_eq!(obj["protocol"]["name"], json!("IPFS"));
        assert_eq!(obj["url"], json!(format!("ipfs://{IPFS_HASH}")));
        assert_eq!(obj["cid"]["version"], json!(1));
        assert_eq!(obj["cid"]["codec"], json!(0x70));
    }

    #[test]
    fn test_from_value_shapes() {
        let raw = ContentHash::from_phex(IPFS_RAW).unwrap();
        assert_eq!(ContentHash::from_value(&json!(IPFS_RAW)).unwrap(), raw);
        assert_eq!(ContentHash::from_value(&json!(raw.bytes().to_vec())).unwrap(), raw);
        assert_eq!(ContentHash::from(&json!(IPFS_RAW), Some("")).unwrap(), raw);
        assert_eq!(IPFS_RAW.parse::<ContentHash>().unwrap(), raw);
    }

    proptest! {
        #[test]
        fn test_generic_url_roundtrip(path in "[a-z0-9/]{0,24}") {
            let url = format!("https://example.org/{path}");
            let ch = ContentHash::from_url(&url).unwrap();
            prop_assert_eq!(ch.protocol(), Protocol::GenericUrl);
            prop_assert_eq!(ch.to_url().unwrap(), url);
            prop_assert_eq!(ContentHash::from_bytes(ch.bytes()).unwrap(), ch);
        }

        #[test]
        fn test_data_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let ch = ContentHash::from_data("application/octet-stream", &data).unwrap();
            let again = ContentHash::from_url(&ch.to_url().unwrap()).unwrap();
            prop_assert_eq!(again.bytes(), ch.bytes());
        }
    }
}
