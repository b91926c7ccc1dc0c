//! Cryptographic Utilities

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a fingerprint
const FINGERPRINT_HEX_LEN: usize = 12;

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Short, non-reversible fingerprint of a secret for log correlation
///
/// Bearer tokens never reach the logs; this prefix of their SHA-256 does.
pub fn fingerprint(secret: &str) -> String {
    let mut hex = hex::encode(sha256(secret.as_bytes()));
    hex.truncate(FINGERPRINT_HEX_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_values() {
        // SHA-256 of empty string
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);

        // SHA-256 of "hello"
        let hash = sha256(b"hello");
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_fingerprint() {
        let fp = fingerprint("hello");
        assert_eq!(fp, "2cf24dba5fb0");
        assert_eq!(fp.len(), FINGERPRINT_HEX_LEN);
        assert_ne!(fingerprint("token-a"), fingerprint("token-b"));
    }
}
