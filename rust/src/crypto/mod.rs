//! Cryptography used by local secure storage: the authenticated vault and the
//! hashing helpers that label key material in logs.

pub mod integrity;
pub mod secrets;
