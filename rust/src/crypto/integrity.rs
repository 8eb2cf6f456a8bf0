//! Hashing helpers. Digests are only ever used to label material in logs so the
//! material itself never has to be printed.

use sha2::{Digest, Sha256};

const FINGERPRINT_HEX_LEN: usize = 16;

/// Produces a raw SHA-256 digest of the provided bytes.
pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Returns the hexadecimal representation of a SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_digest(data))
}

/// Short, stable label for secret or bulky material.
pub fn fingerprint(data: &[u8]) -> String {
    let mut digest = sha256_hex(data);
    digest.truncate(FINGERPRINT_HEX_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::{fingerprint, sha256_hex};

    #[test]
    fn hashes_to_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_is_digest_prefix() {
        assert_eq!(fingerprint(b"abc"), "ba7816bf8f01cfea");
    }
}
