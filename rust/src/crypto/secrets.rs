//! Authenticated secret vault built on ChaCha20-Poly1305.
//! Payloads are stored as nonce + ciphertext + auth tag and flattened into a
//! single opaque token so they can sit next to non-sensitive values in a
//! key-value store.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

const TAG_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
pub const KEY_LEN: usize = 32;
/// Length of a persisted key in hex characters.
pub const KEY_HEX_LEN: usize = KEY_LEN * 2;
const TOKEN_SEPARATOR: char = '.';

#[derive(Debug, Error)]
pub enum SecretVaultError {
    #[error("invalid key length; expected 32 bytes")]
    InvalidKeyLength,
    #[error("hex decoding failed: {0}")]
    HexDecodeFailed(String),
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("base64 decoding failed: {0}")]
    Base64DecodeFailed(String),
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

/// Envelope for encrypted data. The values are base64 encoded (no padding) so
/// the `.`-joined token form never contains the separator inside a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedSecret {
    pub nonce: String,
    pub ciphertext: String,
    pub tag: String,
}

impl EncryptedSecret {
    /// Flattens the envelope into `nonce.ciphertext.tag`.
    pub fn to_token(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.nonce,
            self.ciphertext,
            self.tag,
            sep = TOKEN_SEPARATOR
        )
    }

    /// Parses a token produced by [`EncryptedSecret::to_token`]. Only the shape
    /// is checked here; field contents are validated during decryption.
    pub fn from_token(token: &str) -> Result<Self, SecretVaultError> {
        let mut parts = token.split(TOKEN_SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(nonce), Some(ciphertext), Some(tag), None) if !nonce.is_empty() && !tag.is_empty() => {
                Ok(Self {
                    nonce: nonce.to_string(),
                    ciphertext: ciphertext.to_string(),
                    tag: tag.to_string(),
                })
            }
            _ => Err(SecretVaultError::MalformedToken(
                "expected three '.'-separated fields".to_string(),
            )),
        }
    }
}

/// Generates 32 bytes from the OS CSPRNG and returns them hex encoded.
pub fn generate_key_hex() -> String {
    let mut bytes = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut bytes);
    let encoded = hex::encode(bytes);
    bytes.zeroize();
    encoded
}

/// Returns `true` when `value` has the exact shape of a persisted key.
pub fn is_key_hex(value: &str) -> bool {
    value.len() == KEY_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Maintains a symmetric key used for authenticated encryption of stored payloads.
pub struct SecretVault {
    key: Key,
}

impl std::fmt::Debug for SecretVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretVault").finish_non_exhaustive()
    }
}

impl SecretVault {
    /// Builds a vault from raw key bytes. The key must be 32 bytes for ChaCha20-Poly1305.
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, SecretVaultError> {
        if key_bytes.len() != KEY_LEN {
            return Err(SecretVaultError::InvalidKeyLength);
        }
        let mut key = Key::default();
        key.copy_from_slice(key_bytes);
        Ok(Self { key })
    }

    /// Builds a vault from the 64-character hex form kept in storage slots.
    pub fn from_hex_key(encoded: &str) -> Result<Self, SecretVaultError> {
        let mut decoded = hex::decode(encoded.trim())
            .map_err(|e| SecretVaultError::HexDecodeFailed(format!("{e}")))?;
        let vault = Self::from_key_bytes(&decoded);
        decoded.zeroize();
        vault
    }

    /// Encrypts a plaintext payload into an envelope. Every call draws a fresh nonce.
    pub fn encrypt_secret(&self, plaintext: &[u8]) -> Result<EncryptedSecret, SecretVaultError> {
        let cipher = ChaCha20Poly1305::new(&self.key);
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

        let mut ciphertext_and_tag = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| SecretVaultError::EncryptionFailed(format!("{e}")))?;
        if ciphertext_and_tag.len() < TAG_SIZE {
            return Err(SecretVaultError::EncryptionFailed(
                "ciphertext shorter than authentication tag".to_string(),
            ));
        }
        let tag_start = ciphertext_and_tag.len() - TAG_SIZE;
        let tag_bytes = ciphertext_and_tag.split_off(tag_start);
        let ciphertext = ciphertext_and_tag;

        Ok(EncryptedSecret {
            nonce: STANDARD_NO_PAD.encode(nonce),
            ciphertext: STANDARD_NO_PAD.encode(ciphertext),
            tag: STANDARD_NO_PAD.encode(tag_bytes),
        })
    }

    /// Decrypts an envelope back into plaintext bytes.
    pub fn decrypt_secret(&self, secret: &EncryptedSecret) -> Result<Vec<u8>, SecretVaultError> {
        let nonce_bytes = STANDARD_NO_PAD
            .decode(secret.nonce.as_bytes())
            .map_err(|e| SecretVaultError::Base64DecodeFailed(format!("{e}")))?;
        let ciphertext = STANDARD_NO_PAD
            .decode(secret.ciphertext.as_bytes())
            .map_err(|e| SecretVaultError::Base64DecodeFailed(format!("{e}")))?;
        let tag = STANDARD_NO_PAD
            .decode(secret.tag.as_bytes())
            .map_err(|e| SecretVaultError::Base64DecodeFailed(format!("{e}")))?;

        if nonce_bytes.len() != NONCE_SIZE {
            return Err(SecretVaultError::MalformedEnvelope(
                "nonce length mismatch".to_string(),
            ));
        }
        if tag.len() != TAG_SIZE {
            return Err(SecretVaultError::MalformedEnvelope(
                "tag length mismatch".to_string(),
            ));
        }

        let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
        combined.extend_from_slice(&ciphertext);
        combined.extend_from_slice(&tag);

        let cipher = ChaCha20Poly1305::new(&self.key);
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), combined.as_ref())
            .map_err(|e| SecretVaultError::DecryptionFailed(format!("{e}")))
    }
}

impl Drop for SecretVault {
    fn drop(&mut self) {
        self.key.as_mut_slice().zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_key_hex, is_key_hex, EncryptedSecret, SecretVault, KEY_HEX_LEN};
    use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};

    #[test]
    fn encrypts_and_decrypts_round_trip() {
        let key = [42u8; 32];
        let vault = SecretVault::from_key_bytes(&key).expect("key should be valid");
        let ciphertext = vault
            .encrypt_secret(b"recipient: Jane")
            .expect("encryption should succeed");
        let plaintext = vault
            .decrypt_secret(&ciphertext)
            .expect("decryption should succeed");
        assert_eq!(plaintext, b"recipient: Jane");
    }

    #[test]
    fn generated_keys_are_hex_and_unique() {
        let first = generate_key_hex();
        let second = generate_key_hex();
        assert_eq!(first.len(), KEY_HEX_LEN);
        assert!(is_key_hex(&first));
        assert_ne!(first, second);
        SecretVault::from_hex_key(&first).expect("generated key should load");
    }

    #[test]
    fn rejects_bad_keys() {
        let err = SecretVault::from_key_bytes(&[1u8; 16]).unwrap_err();
        assert!(format!("{err}").contains("invalid key length"));
        let err = SecretVault::from_hex_key("zz").unwrap_err();
        assert!(format!("{err}").contains("hex decoding failed"));
        assert!(!is_key_hex("abc"));
    }

    #[test]
    fn token_form_survives_parsing() {
        let vault = SecretVault::from_key_bytes(&[3u8; 32]).expect("valid key");
        let secret = vault.encrypt_secret(b"payload").expect("encryption should work");
        let parsed = EncryptedSecret::from_token(&secret.to_token()).expect("token should parse");
        assert_eq!(parsed, secret);
        assert!(EncryptedSecret::from_token("not-valid-ciphertext").is_err());
        assert!(EncryptedSecret::from_token("a.b.c.d").is_err());
    }

    #[test]
    fn handles_invalid_ciphertext() {
        let vault = SecretVault::from_key_bytes(&[7u8; 32]).expect("valid key");
        let bogus = EncryptedSecret {
            nonce: STANDARD_NO_PAD.encode([0u8; 12]),
            ciphertext: STANDARD_NO_PAD.encode([0u8; 5]),
            tag: STANDARD_NO_PAD.encode([0u8; 16]),
        };
        let err = vault.decrypt_secret(&bogus).unwrap_err();
        assert!(format!("{err}").contains("decryption failed"));
    }

    #[test]
    fn short_nonce_or_tag_is_malformed() {
        let vault = SecretVault::from_key_bytes(&[7u8; 32]).expect("valid key");
        let short_nonce = EncryptedSecret {
            nonce: STANDARD_NO_PAD.encode([0u8; 4]),
            ciphertext: STANDARD_NO_PAD.encode([0u8; 5]),
            tag: STANDARD_NO_PAD.encode([0u8; 16]),
        };
        let err = vault.decrypt_secret(&short_nonce).unwrap_err();
        assert!(format!("{err}").contains("nonce length mismatch"));

        let short_tag = EncryptedSecret {
            tag: STANDARD_NO_PAD.encode([0u8; 3]),
            nonce: STANDARD_NO_PAD.encode([0u8; 12]),
            ..short_nonce
        };
        let err = vault.decrypt_secret(&short_tag).unwrap_err();
        assert!(format!("{err}").contains("tag length mismatch"));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let sealing = SecretVault::from_key_bytes(&[1u8; 32]).expect("valid key");
        let other = SecretVault::from_key_bytes(&[2u8; 32]).expect("valid key");
        let secret = sealing.encrypt_secret(b"payload").expect("encryption should work");
        assert!(other.decrypt_secret(&secret).is_err());
    }
}
