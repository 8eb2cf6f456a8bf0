use std::sync::Arc;

use docscan_rs::storage::{FileStore, KeyValueStore, MemoryStore, SecureStorage};
use tempfile::tempdir;

#[test]
fn round_trips_plain_and_multibyte_text() {
    let storage = SecureStorage::new(MemoryStore::new());
    for plaintext in ["hello world", "Grüße, 世界 🖋️", "x"] {
        let token = storage
            .encrypt(plaintext, "user@example.com")
            .expect("encryption should succeed");
        assert_ne!(token, plaintext);
        assert_eq!(storage.decrypt(&token, "user@example.com"), plaintext);
    }
}

#[test]
fn unknown_identity_and_garbage_decrypt_to_empty() {
    let storage = SecureStorage::new(MemoryStore::new());
    let token = storage.encrypt("hello world", "user@example.com").expect("encrypt works");

    assert_eq!(storage.decrypt(&token, "stranger@example.com"), "");
    assert_eq!(storage.decrypt("not-valid-ciphertext", "user@example.com"), "");
    assert_eq!(storage.decrypt("", "user@example.com"), "");
    assert_eq!(storage.decrypt(&token, ""), "");
    assert_eq!(
        storage.store().get(&storage.slot_name("stranger@example.com")).expect("store works"),
        None,
        "decrypt must not create keys"
    );
}

#[test]
fn identities_are_isolated() {
    let storage = SecureStorage::new(MemoryStore::new());
    let token = storage.encrypt("for alice only", "alice@example.com").expect("encrypt works");
    storage.encrypt("bob's note", "bob@example.com").expect("encrypt works");

    assert_ne!(
        storage.slot_name("alice@example.com"),
        storage.slot_name("bob@example.com")
    );
    assert_ne!(storage.decrypt(&token, "bob@example.com"), "for alice only");
    assert_eq!(storage.store().len(), 2);
}

#[test]
fn same_plaintext_encrypts_differently() {
    let storage = SecureStorage::new(MemoryStore::new());
    let first = storage.encrypt("same", "a@b.c").expect("encrypt works");
    let second = storage.encrypt("same", "a@b.c").expect("encrypt works");
    assert_ne!(first, second);
}

#[test]
fn tampered_ciphertext_is_rejected() {
    let storage = SecureStorage::new(MemoryStore::new());
    let token = storage.encrypt("amount: 100", "a@b.c").expect("encrypt works");
    let mut fields: Vec<String> = token.split('.').map(str::to_string).collect();
    let flipped = if fields[1].starts_with('A') { "B" } else { "A" };
    fields[1].replace_range(0..1, flipped);
    assert_eq!(storage.decrypt(&fields.join("."), "a@b.c"), "");
}

#[test]
fn handles_sharing_a_store_agree_on_one_key() {
    let shared = Arc::new(MemoryStore::new());
    let first_tab = SecureStorage::new(Arc::clone(&shared));
    let second_tab = SecureStorage::new(Arc::clone(&shared));

    let key_a = first_tab.get_or_create_key("a@b.c").expect("key created");
    let key_b = second_tab.get_or_create_key("a@b.c").expect("key reused");
    assert_eq!(key_a, key_b);

    let token = first_tab.encrypt("shared", "a@b.c").expect("encrypt works");
    assert_eq!(second_tab.decrypt(&token, "a@b.c"), "shared");
}

#[test]
fn keys_survive_reopening_the_file_store() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("keys.json");

    let token = {
        let storage = SecureStorage::new(FileStore::open(&path).expect("store opens"));
        storage.encrypt("persisted", "user@example.com").expect("encrypt works")
    };

    let storage = SecureStorage::new(FileStore::open(&path).expect("store reopens"));
    assert_eq!(storage.decrypt(&token, "user@example.com"), "persisted");

    let raw = std::fs::read_to_string(&path).expect("store file exists");
    let slots: serde_json::Value = serde_json::from_str(&raw).expect("store is json");
    let key = slots["secure_key_user_example_com"].as_str().expect("slot holds a string");
    assert_eq!(key.len(), 64);
    assert!(!raw.contains("persisted"));
}

#[test]
fn custom_namespace_prefixes_slots() {
    let storage = SecureStorage::with_namespace(MemoryStore::new(), "scan_");
    assert_eq!(storage.slot_name("a.b"), "scan_a_b");
    assert_eq!(storage.slot_name("a.b"), storage.slot_name("a.b"));
}

#[test]
fn unwritable_store_never_hands_out_an_unsaved_key() {
    let dir = tempdir().expect("temp dir");
    let sub = dir.path().join("gone");
    std::fs::create_dir(&sub).expect("create dir");
    let storage = SecureStorage::new(FileStore::open(sub.join("keys.json")).expect("open"));
    std::fs::remove_dir_all(&sub).expect("remove dir");

    assert!(storage.encrypt("first", "alice").is_err());
    assert!(storage.encrypt("second", "alice").is_err());
    let slot = storage.slot_name("alice");
    assert_eq!(storage.store().get(&slot).expect("read works"), None);
}
