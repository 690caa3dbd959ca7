//! Content-hash protocols.
//!
//! Each [`Protocol`] interprets the payload that follows the codec varint.
//! All methods take the payload only, never the full envelope.

use cid::Cid;
use data_encoding::{BASE32_NOPAD, BASE64URL_NOPAD};
use multibase::Base;
use multihash::Multihash;
use serde_json::{json, Map, Value};

use enscribe_core::bytes::{phex_from_bytes, utf8_from_bytes};
use enscribe_core::constants::{
    CODEC_ARWEAVE, CODEC_DATA_URL, CODEC_GENERIC_URL, CODEC_IPFS, CODEC_IPNS, CODEC_ONION,
    CODEC_ONION_LEGACY, CODEC_SWARM,
};
use enscribe_core::error::{EnscribeError, Result};
use enscribe_crypto::sha3_256;

use crate::datauri::{self, ShortKey};

/// Separator between scheme and authority.
pub const SCHEME_SEPARATOR: &str = "://";

/// Entry key for protocols without a scheme of their own.
pub const KEY_CONTENTHASH: &str = "contenthash";

/// Entry key for onion addresses.
pub const KEY_ONION: &str = "onion";

/// Host suffix of onion services.
pub const ONION_SUFFIX: &str = ".onion";

const ONION_CHECKSUM_PREFIX: &[u8] = b".onion checksum";
const ONION_LEGACY_LEN: usize = 10;
const ONION_PUBKEY_LEN: usize = 32;
const ONION_LEN: usize = 35;
const ARWEAVE_LEN: usize = 32;

/// The closed set of content-hash protocols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// IPFS CID.
    Ipfs,
    /// IPNS CID.
    Ipns,
    /// Swarm CID.
    Swarm,
    /// Arweave transaction id.
    Arweave,
    /// Tor v2 onion service (10 bytes).
    OnionLegacy,
    /// Tor v3 onion service (pubkey, checksum, version).
    Onion,
    /// Inline `data:` URL.
    DataUrl,
    /// Any other URL, stored as UTF-8.
    GenericUrl,
}

impl Protocol {
    /// Every protocol in codec lookup order.
    pub const ALL: [Protocol; 8] = [
        Protocol::Ipfs,
        Protocol::Ipns,
        Protocol::Swarm,
        Protocol::Arweave,
        Protocol::OnionLegacy,
        Protocol::Onion,
        Protocol::DataUrl,
        Protocol::GenericUrl,
    ];

    /// Envelope codec.
    pub fn codec(&self) -> u64 {
        match self {
            Protocol::Ipfs => CODEC_IPFS,
            Protocol::Ipns => CODEC_IPNS,
            Protocol::Swarm => CODEC_SWARM,
            Protocol::Arweave => CODEC_ARWEAVE,
            Protocol::OnionLegacy => CODEC_ONION_LEGACY,
            Protocol::Onion => CODEC_ONION,
            Protocol::DataUrl => CODEC_DATA_URL,
            Protocol::GenericUrl => CODEC_GENERIC_URL,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Ipfs => "IPFS",
            Protocol::Ipns => "IPNS",
            Protocol::Swarm => "Swarm",
            Protocol::Arweave => "Arweave",
            Protocol::OnionLegacy | Protocol::Onion => "Onion",
            Protocol::DataUrl => "DataURL",
            Protocol::GenericUrl => "URL",
        }
    }

    /// URL scheme, if `<scheme>://<hash>` addresses this protocol.
    pub fn scheme(&self) -> Option<&'static str> {
        match self {
            Protocol::Ipfs => Some("ipfs"),
            Protocol::Ipns => Some("ipns"),
            Protocol::Swarm => Some("bzz"),
            Protocol::Arweave => Some("ar"),
            _ => None,
        }
    }

    /// Looks up a protocol by codec.
    pub fn from_codec(codec: u64) -> Option<Protocol> {
        Self::ALL.into_iter().find(|p| p.codec() == codec)
    }

    /// Looks up a scheme-bearing protocol by scheme.
    pub fn from_scheme(scheme: &str) -> Option<Protocol> {
        Self::ALL.into_iter().find(|p| p.scheme() == Some(scheme))
    }

    fn is_cid(&self) -> bool {
        matches!(self, Protocol::Ipfs | Protocol::Ipns | Protocol::Swarm)
    }

    fn invalid(&self, hash: impl Into<String>, reason: impl ToString) -> EnscribeError {
        EnscribeError::InvalidHash {
            protocol: self.name().into(),
            hash: hash.into(),
            reason: reason.to_string(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PARSING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parses the protocol-native hash of a scheme-bearing protocol into a payload.
    ///
    /// CIDv0 strings are upgraded to CIDv1 so the payload always carries a version.
    pub fn parse_hash(&self, hash: &str) -> Result<Vec<u8>> {
        if self.is_cid() {
            let cid = Cid::try_from(hash).map_err(|e| self.invalid(hash, e))?;
            let cid = cid.into_v1().map_err(|e| self.invalid(hash, e))?;
            return Ok(cid.to_bytes());
        }
        match self {
            Protocol::Arweave => {
                let v = BASE64URL_NOPAD
                    .decode(hash.as_bytes())
                    .map_err(|e| self.invalid(hash, e))?;
                self.validate(&v)?;
                Ok(v)
            }
            _ => Err(self.invalid(hash, "protocol has no hash form")),
        }
    }

    fn parse_cid(&self, v: &[u8]) -> Result<Cid> {
        let cid = Cid::try_from(v).map_err(|e| self.invalid(phex_from_bytes(v), e))?;
        if cid.to_bytes() != v {
            return Err(self.invalid(phex_from_bytes(v), "trailing bytes after CID"));
        }
        Ok(cid)
    }

    /// Checks that a payload is well-formed for this protocol.
    pub fn validate(&self, v: &[u8]) -> Result<()> {
        let expect_len = |len: usize| {
            if v.len() == len {
                Ok(())
            } else {
                Err(self.invalid(
                    phex_from_bytes(v),
                    format!("expected {len} bytes, got {}", v.len()),
                ))
            }
        };
        match self {
            Protocol::Ipfs | Protocol::Ipns | Protocol::Swarm => self.parse_cid(v).map(|_| ()),
            Protocol::Arweave => expect_len(ARWEAVE_LEN),
            Protocol::OnionLegacy => expect_len(ONION_LEGACY_LEN),
            Protocol::Onion => {
                expect_len(ONION_LEN)?;
                verify_onion_checksum(v)
            }
            Protocol::DataUrl => datauri::decode_payload(v).map(|_| ()),
            Protocol::GenericUrl => utf8_from_bytes(v).map(|_| ()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RENDERING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Protocol-native hash string.
    ///
    /// CIDv1 renders in base36, CIDv0 in base58. Onion addresses are lowercase base32.
    pub fn to_hash(&self, v: &[u8]) -> Result<String> {
        match self {
            Protocol::Ipfs | Protocol::Ipns | Protocol::Swarm => {
                let cid = self.parse_cid(v)?;
                match cid.version() {
                    cid::Version::V0 => Ok(cid.to_string()),
                    cid::Version::V1 => cid
                        .to_string_of_base(Base::Base36Lower)
                        .map_err(|e| self.invalid(phex_from_bytes(v), e)),
                }
            }
            Protocol::Arweave => Ok(BASE64URL_NOPAD.encode(v)),
            Protocol::OnionLegacy | Protocol::Onion => Ok(BASE32_NOPAD.encode(v).to_ascii_lowercase()),
            Protocol::DataUrl | Protocol::GenericUrl => self.to_url(v),
        }
    }

    /// URL form: `<scheme>://<hash>`, `http://<hash>.onion`, a `data:` URL, or the stored URL.
    pub fn to_url(&self, v: &[u8]) -> Result<String> {
        match self {
            Protocol::OnionLegacy | Protocol::Onion => {
                Ok(format!("http://{}{ONION_SUFFIX}", self.to_hash(v)?))
            }
            Protocol::DataUrl => {
                let (mime, data) = datauri::decode_payload(v)?;
                Ok(datauri::to_url(&mime, data))
            }
            Protocol::GenericUrl => utf8_from_bytes(v),
            _ => {
                let scheme = self.scheme().unwrap_or_default();
                Ok(format!("{scheme}{SCHEME_SEPARATOR}{}", self.to_hash(v)?))
            }
        }
    }

    /// The most ergonomic `(key, value)` pair.
    ///
    /// Scheme protocols use their scheme; onion uses `onion`; data URLs with a
    /// short MIME use `text`, `html` or `json` with a native value; everything
    /// else uses `contenthash` with its URL.
    pub fn to_entry(&self, v: &[u8]) -> Result<(String, Value)> {
        match self {
            Protocol::OnionLegacy | Protocol::Onion => {
                Ok((KEY_ONION.into(), Value::String(self.to_hash(v)?)))
            }
            Protocol::DataUrl => {
                let (mime, data) = datauri::decode_payload(v)?;
                match ShortKey::by_mime(&mime) {
                    Some(short) => Ok((short.key.into(), short.decode(data)?)),
                    None => Ok((KEY_CONTENTHASH.into(), Value::String(datauri::to_url(&mime, data)))),
                }
            }
            Protocol::GenericUrl => Ok((KEY_CONTENTHASH.into(), Value::String(self.to_url(v)?))),
            _ => {
                let scheme = self.scheme().unwrap_or_default();
                Ok((scheme.into(), Value::String(self.to_hash(v)?)))
            }
        }
    }

    /// Protocol-specific decomposition of the payload.
    pub fn to_object(&self, v: &[u8]) -> Result<Value> {
        match self {
            Protocol::Ipfs | Protocol::Ipns | Protocol::Swarm => {
                let cid = self.parse_cid(v)?;
                Ok(json!({
                    "hash": self.to_hash(v)?,
                    "cid": {
                        "version": u64::from(cid.version()),
                        "codec": cid.codec(),
                        "multihash": multihash_object(cid.hash()),
                    },
                }))
            }
            Protocol::Arweave | Protocol::OnionLegacy => Ok(json!({ "hash": self.to_hash(v)? })),
            Protocol::Onion => {
                self.validate(v)?;
                Ok(json!({
                    "hash": self.to_hash(v)?,
                    "pubkey": phex_from_bytes(&v[..ONION_PUBKEY_LEN]),
                    "checksum": phex_from_bytes(&v[ONION_PUBKEY_LEN..ONION_LEN - 1]),
                    "version": v[ONION_LEN - 1],
                }))
            }
            Protocol::DataUrl => {
                let (mime, data) = datauri::decode_payload(v)?;
                match ShortKey::by_mime(&mime) {
                    Some(short) => {
                        let mut obj = Map::new();
                        obj.insert(short.key.into(), short.decode(data)?);
                        Ok(Value::Object(obj))
                    }
                    None => Ok(json!({ "mime": mime, "data": phex_from_bytes(data) })),
                }
            }
            Protocol::GenericUrl => Ok(url_object(&utf8_from_bytes(v)?)),
        }
    }

    /// Default HTTPS gateway for a hash, if the protocol has one.
    pub fn gateway(&self, hash: &str) -> Option<String> {
        match self {
            Protocol::Ipfs => Some(format!("https://cloudflare-ipfs.com/ipfs/{hash}")),
            Protocol::Ipns => Some(format!("https://{hash}.ipfs2.eth.limo")),
            Protocol::Swarm => Some(format!("https://{hash}.bzz.link")),
            Protocol::Arweave => Some(format!("https://arweave.net/{hash}")),
            Protocol::OnionLegacy | Protocol::Onion => Some(format!("https://{hash}.onion.to")),
            Protocol::DataUrl | Protocol::GenericUrl => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ONION
// ═══════════════════════════════════════════════════════════════════════════════

fn onion_checksum(pubkey: &[u8], version: u8) -> [u8; 2] {
    let hash = sha3_256(&[ONION_CHECKSUM_PREFIX, pubkey, &[version]]);
    [hash[0], hash[1]]
}

fn verify_onion_checksum(v: &[u8]) -> Result<()> {
    let pubkey = &v[..ONION_PUBKEY_LEN];
    let actual = &v[ONION_PUBKEY_LEN..ONION_LEN - 1];
    let expected = onion_checksum(pubkey, v[ONION_LEN - 1]);
    if actual != expected {
        return Err(EnscribeError::Checksum {
            expected: phex_from_bytes(&expected),
            actual: phex_from_bytes(actual),
        });
    }
    Ok(())
}

/// Builds a v3 onion payload (`pubkey || checksum || version`) from a 32-byte pubkey.
pub fn onion_from_pubkey(pubkey: &[u8], version: u8) -> Result<Vec<u8>> {
    if pubkey.len() != ONION_PUBKEY_LEN {
        return Err(EnscribeError::InvalidLength {
            expected: ONION_PUBKEY_LEN,
            actual: pubkey.len(),
        });
    }
    let mut v = Vec::with_capacity(ONION_LEN);
    v.extend_from_slice(pubkey);
    v.extend_from_slice(&onion_checksum(pubkey, version));
    v.push(version);
    Ok(v)
}

/// Decodes an onion address (without `.onion`) into its protocol and payload.
///
/// 16 characters is a legacy v2 address; 56 characters is v3 and has its
/// checksum verified.
pub fn parse_onion(hash: &str) -> Result<(Protocol, Vec<u8>)> {
    let v = BASE32_NOPAD
        .decode(hash.to_ascii_uppercase().as_bytes())
        .map_err(|e| Protocol::Onion.invalid(hash, e))?;
    match v.len() {
        ONION_LEGACY_LEN => Ok((Protocol::OnionLegacy, v)),
        ONION_LEN => {
            verify_onion_checksum(&v)?;
            Ok((Protocol::Onion, v))
        }
        n => Err(Protocol::Onion.invalid(hash, format!("unexpected length {n}"))),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn multihash_object(mh: &Multihash<64>) -> Value {
    json!({
        "code": mh.code(),
        "size": mh.size(),
        "digest": phex_from_bytes(mh.digest()),
    })
}

/// Parts of `scheme://authority/rest`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlParts<'a> {
    /// Text before `://`.
    pub scheme: &'a str,
    /// Text up to the first `/` after the scheme.
    pub authority: &'a str,
    /// Remainder, starting with `/` when present.
    pub rest: &'a str,
}

/// Splits a URL without interpreting it.
pub fn split_url(url: &str) -> Result<UrlParts<'_>> {
    let pos = url
        .find(SCHEME_SEPARATOR)
        .filter(|&pos| pos > 0)
        .ok_or_else(|| EnscribeError::Format(format!("expected scheme separator: {url}")))?;
    let (scheme, tail) = (&url[..pos], &url[pos + SCHEME_SEPARATOR.len()..]);
    let (authority, rest) = match tail.find('/') {
        Some(i) => tail.split_at(i),
        None => (tail, ""),
    };
    Ok(UrlParts {
        scheme,
        authority,
        rest,
    })
}

fn url_object(raw: &str) -> Value {
    match url::Url::parse(raw) {
        Ok(u) => {
            let mut obj = Map::new();
            obj.insert("href".into(), json!(u.as_str()));
            obj.insert("scheme".into(), json!(u.scheme()));
            if let Some(host) = u.host_str() {
                obj.insert("host".into(), json!(host));
            }
            if let Some(port) = u.port() {
                obj.insert("port".into(), json!(port));
            }
            obj.insert("path".into(), json!(u.path()));
            if let Some(query) = u.query() {
                obj.insert("query".into(), json!(query));
            }
            if let Some(fragment) = u.fragment() {
                obj.insert("fragment".into(), json!(fragment));
            }
            Value::Object(obj)
        }
        Err(_) => match split_url(raw) {
            Ok(parts) => json!({
                "scheme": parts.scheme,
                "authority": parts.authority,
                "rest": parts.rest,
            }),
            Err(_) => json!({ "href": raw }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const ONION_V3: &str = "2gzyxa5ihm7nsggfxnu52rck2vv4rvmdlkiu3zzui5du4xyclen53wid";
    const ONION_V2: &str = "expyuzz4wqqyqhjn";

    #[test_case(Protocol::Ipfs, 0xE3, Some("ipfs"))]
    #[test_case(Protocol::Ipns, 0xE5, Some("ipns"))]
    #[test_case(Protocol::Swarm, 0xE4, Some("bzz"))]
    #[test_case(Protocol::Arweave, 0xB29910, Some("ar"))]
    #[test_case(Protocol::OnionLegacy, 0x1BC, None)]
    #[test_case(Protocol::Onion, 0x1BD, None)]
    #[test_case(Protocol::DataUrl, 0x12345, None)]
    #[test_case(Protocol::GenericUrl, 0x12346, None)]
    fn test_protocol_table(protocol: Protocol, codec: u64, scheme: Option<&str>) {
        assert_eq!(protocol.codec(), codec);
        assert_eq!(protocol.scheme(), scheme);
        assert_eq!(Protocol::from_codec(codec), Some(protocol));
        if let Some(scheme) = scheme {
            assert_eq!(Protocol::from_scheme(scheme), Some(protocol));
        }
    }

    #[test]
    fn test_onion_v3() {
        let (protocol, v) = parse_onion(ONION_V3).unwrap();
        assert_eq!(protocol, Protocol::Onion);
        assert_eq!(v.len(), 35);
        assert_eq!(v[34], 3);
        assert_eq!(protocol.to_hash(&v).unwrap(), ONION_V3);
        assert_eq!(onion_from_pubkey(&v[..32], 3).unwrap(), v);
        assert_eq!(protocol.to_url(&v).unwrap(), format!("http://{ONION_V3}.onion"));
        assert_eq!(protocol.to_object(&v).unwrap()["version"], json!(3));
    }

    #[test]
    fn test_onion_v3_bad_checksum() {
        let (_, mut v) = parse_onion(ONION_V3).unwrap();
        v[32] ^= 1;
        let tampered = BASE32_NOPAD.encode(&v).to_ascii_lowercase();
        assert!(matches!(parse_onion(&tampered), Err(EnscribeError::Checksum { .. })));
        assert!(matches!(Protocol::Onion.validate(&v), Err(EnscribeError::Checksum { .. })));
    }

    #[test]
    fn test_onion_legacy() {
        let (protocol, v) = parse_onion(ONION_V2).unwrap();
        assert_eq!(protocol, Protocol::OnionLegacy);
        assert_eq!(v.len(), 10);
        assert_eq!(protocol.to_hash(&v).unwrap(), ONION_V2);
        assert_eq!(protocol.to_entry(&v).unwrap(), ("onion".into(), json!(ONION_V2)));
        assert!(parse_onion("abcd").is_err());
    }

    #[test]
    fn test_arweave() {
        let hash = "yBYkngZXGCQgYU-nUCwo5vns2ALUU0LXXZrCUlUUWkk";
        let v = Protocol::Arweave.parse_hash(hash).unwrap();
        assert_eq!(v.len(), 32);
        assert_eq!(Protocol::Arweave.to_hash(&v).unwrap(), hash);
        assert_eq!(Protocol::Arweave.to_url(&v).unwrap(), format!("ar://{hash}"));
        assert!(Protocol::Arweave.parse_hash("AAAA").is_err());
    }

    #[test]
    fn test_cidv0_upgrades() {
        let v = Protocol::Ipfs
            .parse_hash("QmZcH4YvBVVRJtdn4RdbaqgspFU8gH6P9vomDpBVpAL3u4")
            .unwrap();
        assert_eq!(&v[..2], &[0x01, 0x70]);
        assert!(Protocol::Ipfs.to_hash(&v).unwrap().starts_with('k'));
    }

    #[test]
    fn test_cid_rejects_trailing_bytes() {
        let mut v = Protocol::Ipfs
            .parse_hash("QmZcH4YvBVVRJtdn4RdbaqgspFU8gH6P9vomDpBVpAL3u4")
            .unwrap();
        v.push(0);
        assert!(Protocol::Ipfs.validate(&v).is_err());
    }

    #[test]
    fn test_split_url() {
        let parts = split_url("https://example.com/a/b").unwrap();
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.authority, "example.com");
        assert_eq!(parts.rest, "/a/b");
        assert!(split_url("example.com").is_err());
        assert!(split_url("://x").is_err());
    }

    #[test]
    fn test_generic_url_object() {
        let v = b"https://example.com:8443/x?y=1";
        let obj = Protocol::GenericUrl.to_object(v).unwrap();
        assert_eq!(obj["host"], json!("example.com"));
        assert_eq!(obj["port"], json!(8443));
        assert_eq!(obj["query"], json!("y=1"));
    }
}
