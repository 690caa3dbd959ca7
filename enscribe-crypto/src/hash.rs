//! Hashing primitives.
//!
//! ENS hashes names with Keccak-256 (the pre-standard SHA-3 padding), while the
//! Tor onion v3 checksum uses the standardized SHA3-256. Both come from `sha3`.

use sha3::{Digest, Keccak256, Sha3_256};

// ═══════════════════════════════════════════════════════════════════════════════
// KECCAK256
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes Keccak256 hash (namehash, selectors, Ethereum addresses).
///
/// Note: Keccak256 is NOT SHA3-256. They use different padding.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    Digest::update(&mut hasher, input);
    hasher.finalize().into()
}

/// Computes Keccak256 over the concatenation of several inputs.
pub fn keccak256_multi(inputs: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for input in inputs {
        Digest::update(&mut hasher, input);
    }
    hasher.finalize().into()
}

/// Returns the 4-byte function selector of a Solidity signature.
pub fn selector(signature: &str) -> u32 {
    let hash = keccak256(signature.as_bytes());
    u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHA3-256
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes SHA3-256 over the concatenation of several inputs.
pub fn sha3_256(inputs: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    for input in inputs {
        Digest::update(&mut hasher, input);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use enscribe_core::constants::*;
    use test_case::test_case;

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"hello");

        // Known test vector
        let expected = hex::decode(
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        ).unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_keccak256_is_not_sha3() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            hex::encode(sha3_256(&[])),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn test_multi_matches_concatenation() {
        assert_eq!(keccak256_multi(&[b"hel".as_slice(), b"lo".as_slice()]), keccak256(b"hello"));
    }

    #[test_case("text(bytes32,string)", SEL_TEXT)]
    #[test_case("addr(bytes32,uint256)", SEL_ADDR)]
    #[test_case("addr(bytes32)", SEL_ADDR0)]
    #[test_case("contenthash(bytes32)", SEL_CONTENTHASH)]
    #[test_case("pubkey(bytes32)", SEL_PUBKEY)]
    #[test_case("name(bytes32)", SEL_NAME)]
    #[test_case("setText(bytes32,string,string)", SEL_SET_TEXT)]
    #[test_case("setAddr(bytes32,uint256,bytes)", SEL_SET_ADDR)]
    #[test_case("setContenthash(bytes32,bytes)", SEL_SET_CONTENTHASH)]
    #[test_case("setPubkey(bytes32,bytes32,bytes32)", SEL_SET_PUBKEY)]
    #[test_case("setName(bytes32,string)", SEL_SET_NAME)]
    fn test_selector_constants(signature: &str, expected: u32) {
        assert_eq!(selector(signature), expected);
    }
}
