//! Authenticated encryption of pad content.
//!
//! Single-layer AES-256-GCM with a random 96-bit nonce per call and a
//! 128-bit authentication tag, plus a nested "double lock" variant that
//! re-encrypts the serialized single-layer payload under a second key.
//! Ciphertext, nonce, and tag travel as three separate base64 fields and
//! are only recombined at decryption time.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::key::DerivedKey;
use crate::error::{PadError, Result};

/// Nonce length in bytes (96 bits).
const IV_LENGTH: usize = 12;

/// Authentication tag length in bytes (128 bits).
const TAG_LENGTH: usize = 16;

/// An encrypted pad payload: the wire and at-rest shape of all content.
///
/// All three fields are base64. This struct is also the canonical inner
/// record for the double lock: the triple is serialized as JSON and that
/// JSON is what the outer layer encrypts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    pub ciphertext: String,
    pub iv: String,
    pub auth_tag: String,
}

/// Result of [`encrypt_with_optional_lock`]: the payload to store and
/// whether it carries the second layer.
#[derive(Debug, Clone)]
pub struct LockedPayload {
    pub payload: EncryptedPayload,
    pub is_locked: bool,
}

fn cipher_for(key: &DerivedKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PadError::Crypto(format!("Invalid AES key: {}", e)))
}

fn decode_field(field: &str) -> Result<Vec<u8>> {
    // A payload field that is not even valid base64 fails the same way a
    // tampered one does.
    STANDARD.decode(field).map_err(|_| PadError::DecryptionFailed)
}

/// Encrypt plaintext under a single key.
///
/// Generates a fresh random nonce per call (never reused for the same
/// key) and splits the authentication tag off the ciphertext so the two
/// are stored separately.
pub fn encrypt(plaintext: &str, key: &DerivedKey) -> Result<EncryptedPayload> {
    let cipher = cipher_for(key)?;

    let mut iv = [0u8; IV_LENGTH];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    // aes-gcm appends the tag to the ciphertext
    let sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| PadError::Crypto("Encryption failed".to_string()))?;
    let split = sealed.len() - TAG_LENGTH;

    Ok(EncryptedPayload {
        ciphertext: STANDARD.encode(&sealed[..split]),
        iv: STANDARD.encode(iv),
        auth_tag: STANDARD.encode(&sealed[split..]),
    })
}

/// Decrypt a payload under a single key.
///
/// # Errors
///
/// Returns `PadError::DecryptionFailed` if the tag does not verify -
/// tampered ciphertext, wrong key, or corrupted fields all look the same
/// to the caller. There is no partial plaintext.
pub fn decrypt(payload: &EncryptedPayload, key: &DerivedKey) -> Result<String> {
    let cipher = cipher_for(key)?;

    let mut sealed = decode_field(&payload.ciphertext)?;
    let iv = decode_field(&payload.iv)?;
    let tag = decode_field(&payload.auth_tag)?;
    if iv.len() != IV_LENGTH || tag.len() != TAG_LENGTH {
        return Err(PadError::DecryptionFailed);
    }
    sealed.extend_from_slice(&tag);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_slice())
        .map_err(|_| PadError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| PadError::DecryptionFailed)
}

/// Encrypt plaintext under a primary key, optionally nesting the result
/// inside a second layer under a lock key.
///
/// With a lock key, the plaintext is first sealed under the primary key,
/// the resulting triple is serialized to JSON, and that JSON is sealed
/// under the lock key. Only the outer payload is returned; the inner
/// payload never touches storage directly. Each layer is independently
/// authenticated, so a forged outer layer is rejected before the inner
/// ciphertext is ever touched.
pub fn encrypt_with_optional_lock(
    plaintext: &str,
    primary_key: &DerivedKey,
    lock_key: Option<&DerivedKey>,
) -> Result<LockedPayload> {
    match lock_key {
        None => Ok(LockedPayload {
            payload: encrypt(plaintext, primary_key)?,
            is_locked: false,
        }),
        Some(lock_key) => {
            let inner = encrypt(plaintext, primary_key)?;
            let inner_json = serde_json::to_string(&inner)?;
            let outer = encrypt(&inner_json, lock_key)?;
            Ok(LockedPayload {
                payload: outer,
                is_locked: true,
            })
        }
    }
}

/// Decrypt a payload that may carry the optional second layer.
///
/// # Errors
///
/// - `PadError::LockCodeRequired` when `is_locked` is set but no lock key
///   was supplied - a recoverable condition, the caller should prompt for
///   the second code.
/// - `PadError::DecryptionFailed` when either layer fails to decrypt.
///   The two layers are deliberately indistinguishable in the error, so a
///   caller cannot probe which of the two codes was wrong.
pub fn decrypt_with_optional_lock(
    payload: &EncryptedPayload,
    primary_key: &DerivedKey,
    is_locked: bool,
    lock_key: Option<&DerivedKey>,
) -> Result<String> {
    if !is_locked {
        return decrypt(payload, primary_key);
    }

    let lock_key = lock_key.ok_or(PadError::LockCodeRequired)?;
    let inner_json = decrypt(payload, lock_key)?;
    let inner: EncryptedPayload =
        serde_json::from_str(&inner_json).map_err(|_| PadError::DecryptionFailed)?;
    decrypt(&inner, primary_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::derive_key;

    fn test_key(code: &str) -> DerivedKey {
        derive_key(code, b"test-salt-1234567890").unwrap()
    }

    /// Flip one bit in the middle of a base64 field's decoded bytes.
    fn corrupt(field: &str) -> String {
        let mut bytes = STANDARD.decode(field).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x01;
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = test_key("primary-code");
        let plaintext = "Hello, World! This is secret pad content.";

        let payload = encrypt(plaintext, &key).unwrap();
        let decrypted = decrypt(&payload, &key).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext_round_trip() {
        let key = test_key("primary-code");

        let payload = encrypt("", &key).unwrap();
        assert!(payload.ciphertext.is_empty());
        assert_eq!(decrypt(&payload, &key).unwrap(), "");
    }

    #[test]
    fn test_nonce_fresh_per_call() {
        let key = test_key("primary-code");

        let p1 = encrypt("same plaintext", &key).unwrap();
        let p2 = encrypt("same plaintext", &key).unwrap();

        assert_ne!(p1.iv, p2.iv);
        assert_ne!(p1.ciphertext, p2.ciphertext);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = test_key("primary-code");
        let mut payload = encrypt("secret content", &key).unwrap();

        payload.ciphertext = corrupt(&payload.ciphertext);
        assert!(matches!(
            decrypt(&payload, &key),
            Err(PadError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_tampered_iv_fails() {
        let key = test_key("primary-code");
        let mut payload = encrypt("secret content", &key).unwrap();

        payload.iv = corrupt(&payload.iv);
        assert!(matches!(
            decrypt(&payload, &key),
            Err(PadError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_tampered_auth_tag_fails() {
        let key = test_key("primary-code");
        let mut payload = encrypt("secret content", &key).unwrap();

        payload.auth_tag = corrupt(&payload.auth_tag);
        assert!(matches!(
            decrypt(&payload, &key),
            Err(PadError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_garbage_base64_fails() {
        let key = test_key("primary-code");
        let mut payload = encrypt("secret content", &key).unwrap();

        payload.auth_tag = "not base64!!".to_string();
        assert!(matches!(
            decrypt(&payload, &key),
            Err(PadError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let payload = encrypt("secret content", &test_key("right-code")).unwrap();

        // Different code, same salt
        let result = decrypt(&payload, &test_key("wrong-code"));
        assert!(matches!(result, Err(PadError::DecryptionFailed)));

        // Same code, different salt
        let other_salt_key = derive_key("right-code", b"other-salt-0987654321").unwrap();
        let result = decrypt(&payload, &other_salt_key);
        assert!(matches!(result, Err(PadError::DecryptionFailed)));
    }

    #[test]
    fn test_optional_lock_absent_is_single_layer() {
        let primary = test_key("primary-code");

        let locked = encrypt_with_optional_lock("content", &primary, None).unwrap();
        assert!(!locked.is_locked);

        // Plain single-layer decrypt works on the payload
        assert_eq!(decrypt(&locked.payload, &primary).unwrap(), "content");
    }

    #[test]
    fn test_double_lock_round_trip() {
        let primary = test_key("primary-code");
        let lock = test_key("lock-code");

        let locked = encrypt_with_optional_lock("double secret", &primary, Some(&lock)).unwrap();
        assert!(locked.is_locked);

        let decrypted =
            decrypt_with_optional_lock(&locked.payload, &primary, true, Some(&lock)).unwrap();
        assert_eq!(decrypted, "double secret");
    }

    #[test]
    fn test_locked_payload_requires_lock_key() {
        let primary = test_key("primary-code");
        let lock = test_key("lock-code");

        let locked = encrypt_with_optional_lock("double secret", &primary, Some(&lock)).unwrap();

        let result = decrypt_with_optional_lock(&locked.payload, &primary, true, None);
        assert!(matches!(result, Err(PadError::LockCodeRequired)));
    }

    #[test]
    fn test_wrong_lock_and_wrong_primary_look_the_same() {
        let primary = test_key("primary-code");
        let lock = test_key("lock-code");
        let wrong = test_key("wrong-code");

        let locked = encrypt_with_optional_lock("double secret", &primary, Some(&lock)).unwrap();

        let bad_lock = decrypt_with_optional_lock(&locked.payload, &primary, true, Some(&wrong));
        let bad_primary = decrypt_with_optional_lock(&locked.payload, &wrong, true, Some(&lock));

        assert!(matches!(bad_lock, Err(PadError::DecryptionFailed)));
        assert!(matches!(bad_primary, Err(PadError::DecryptionFailed)));
    }

    #[test]
    fn test_payload_serde_wire_names() {
        let key = test_key("primary-code");
        let payload = encrypt("content", &key).unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("ciphertext").is_some());
        assert!(json.get("iv").is_some());
        assert!(json.get("authTag").is_some());
    }
}
