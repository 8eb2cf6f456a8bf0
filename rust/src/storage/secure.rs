//! Per-identity encryption of opaque string payloads.
//!
//! Each identity owns one randomly generated 256-bit key, persisted hex encoded
//! in the slot `namespace + sanitized identity`. Keys are created lazily on the
//! first `encrypt` and never rotated here. Losing the store loses every
//! ciphertext sealed under it.

use thiserror::Error;
use tracing::{error, info, warn};

use super::{KeyValueStore, StorageError};
use crate::crypto::integrity::fingerprint;
use crate::crypto::secrets::{
    generate_key_hex, is_key_hex, EncryptedSecret, SecretVault, SecretVaultError,
};

pub const DEFAULT_NAMESPACE: &str = "secure_key_";
/// Suffix of the slot used when no identity is supplied. `*` never survives
/// sanitization, so no real identity can land here.
const SHARED_SLOT_SUFFIX: &str = "*shared";

#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("no key stored for this identity")]
    KeyAbsent,
    #[error("stored key is malformed")]
    MalformedKey,
    #[error("ciphertext is malformed: {0}")]
    MalformedCiphertext(String),
    #[error("ciphertext rejected (wrong key or tampered data)")]
    Rejected,
    #[error("plaintext is not valid UTF-8")]
    NotUtf8,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_identity(identity: &str) -> String {
    identity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub struct SecureStorage<S: KeyValueStore> {
    store: S,
    namespace: String,
}

impl<S: KeyValueStore> SecureStorage<S> {
    pub fn new(store: S) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Storage slot holding the key for `identity`.
    pub fn slot_name(&self, identity: &str) -> String {
        format!("{}{}", self.namespace, sanitize_identity(identity))
    }

    fn shared_slot(&self) -> String {
        format!("{}{}", self.namespace, SHARED_SLOT_SUFFIX)
    }

    /// Returns the hex key for `identity`, generating and persisting one if the
    /// slot is empty. When another writer fills the slot first, its key wins.
    pub fn get_or_create_key(&self, identity: &str) -> Result<String, StorageError> {
        let slot = self.slot_name(identity);
        self.key_for_slot(&slot)
    }

    fn key_for_slot(&self, slot: &str) -> Result<String, StorageError> {
        let fresh = generate_key_hex();
        let stored = match self.store.get(slot)? {
            Some(existing) if is_key_hex(&existing) => return Ok(existing),
            Some(malformed) => {
                warn!(slot = %slot, "stored key is malformed; replacing it with a fresh key");
                self.store.compare_and_swap(slot, &malformed, &fresh)?
            }
            None => self
                .store
                .set_if_absent(slot, &fresh)?
                .unwrap_or_else(|| fresh.clone()),
        };

        if stored == fresh {
            info!(slot = %slot, key_id = %fingerprint(fresh.as_bytes()), "generated key");
            return Ok(fresh);
        }
        if !is_key_hex(&stored) {
            return Err(StorageError::Corrupt(format!("{slot}: key slot holds malformed key material")));
        }
        Ok(stored)
    }

    /// Encrypts `plaintext` under the identity's key. An empty identity falls
    /// back to the shared slot, which isolates nothing; callers needing strict
    /// binding must check the identity themselves.
    pub fn encrypt(&self, plaintext: &str, identity: &str) -> Result<String, StorageError> {
        let slot = if identity.is_empty() {
            warn!("no identity supplied; encrypting with the shared fallback key");
            self.shared_slot()
        } else {
            self.slot_name(identity)
        };

        let key = self.key_for_slot(&slot)?;
        let vault = SecretVault::from_hex_key(&key)
            .map_err(|e| StorageError::Corrupt(format!("{slot}: {e}")))?;
        let secret = vault
            .encrypt_secret(plaintext.as_bytes())
            .map_err(|e| StorageError::Write(format!("{e}")))?;
        Ok(secret.to_token())
    }

    /// Decrypts a token from [`SecureStorage::encrypt`]. Any failure yields an
    /// empty string and a logged diagnostic.
    pub fn decrypt(&self, ciphertext: &str, identity: &str) -> String {
        if ciphertext.is_empty() || identity.is_empty() {
            return String::new();
        }
        match self.try_decrypt(ciphertext, identity) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                error!(slot = %self.slot_name(identity), error = %err, "decryption failed");
                String::new()
            }
        }
    }

    /// Like [`SecureStorage::decrypt`] but reports why decryption failed. Never
    /// creates a key.
    pub fn try_decrypt(&self, ciphertext: &str, identity: &str) -> Result<String, DecryptError> {
        if ciphertext.is_empty() || identity.is_empty() {
            return Ok(String::new());
        }

        let key = self
            .store
            .get(&self.slot_name(identity))?
            .ok_or(DecryptError::KeyAbsent)?;
        let vault = SecretVault::from_hex_key(&key).map_err(|_| DecryptError::MalformedKey)?;
        let secret = EncryptedSecret::from_token(ciphertext)
            .map_err(|e| DecryptError::MalformedCiphertext(format!("{e}")))?;
        let plaintext = vault.decrypt_secret(&secret).map_err(|e| match e {
            SecretVaultError::Base64DecodeFailed(msg) | SecretVaultError::MalformedEnvelope(msg) => {
                DecryptError::MalformedCiphertext(msg)
            }
            _ => DecryptError::Rejected,
        })?;
        String::from_utf8(plaintext).map_err(|_| DecryptError::NotUtf8)
    }

    /// Drops the identity's key. Ciphertexts sealed under it become unreadable.
    pub fn forget(&self, identity: &str) -> Result<(), StorageError> {
        let slot = self.slot_name(identity);
        self.store.remove(&slot)?;
        info!(slot = %slot, "removed key");
        Ok(())
    }
}
