//! Request validation.
//!
//! Everything here runs before any storage call: malformed identifiers,
//! oversize payloads, and over-limit word counts are rejected up front.

use crate::crypto::EncryptedPayload;
use crate::error::{PadError, Result};

/// Maximum plaintext word count a pad may report.
pub const MAX_WORDS: u32 = 500_000;

/// Payload ceiling for the base64 `encrypted_content` field.
pub const MAX_CONTENT_BYTES: usize = 4 * 1024 * 1024;

/// Length of a pad hash: SHA-256 as lowercase hex.
pub const PAD_HASH_LENGTH: usize = 64;

/// Validate the shape of a pad hash: exactly 64 lowercase hex characters.
///
/// This is checked before any lookup; nothing else about the code is ever
/// visible server-side.
pub fn validate_pad_hash(pad_hash: &str) -> Result<()> {
    if pad_hash.len() != PAD_HASH_LENGTH
        || !pad_hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    {
        return Err(PadError::Validation(
            "Pad hash must be 64 lowercase hex characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate an encrypted payload's field shapes and size.
///
/// `allow_empty_content` is true only at create time: a brand-new pad may
/// carry the encryption of the empty string, whose AES-GCM ciphertext is
/// empty. Updates always carry content.
pub fn validate_payload(payload: &EncryptedPayload, allow_empty_content: bool) -> Result<()> {
    if payload.ciphertext.is_empty() && !allow_empty_content {
        return Err(PadError::Validation(
            "Encrypted content cannot be empty".to_string(),
        ));
    }
    if payload.ciphertext.len() > MAX_CONTENT_BYTES {
        return Err(PadError::Validation(format!(
            "Encrypted content too large (max {} bytes)",
            MAX_CONTENT_BYTES
        )));
    }
    if payload.iv.is_empty() {
        return Err(PadError::Validation("IV cannot be empty".to_string()));
    }
    if payload.auth_tag.is_empty() {
        return Err(PadError::Validation("Auth tag cannot be empty".to_string()));
    }
    Ok(())
}

/// Validate a reported word count against the global cap.
pub fn validate_word_count(word_count: u32) -> Result<()> {
    if word_count > MAX_WORDS {
        return Err(PadError::Validation(format!(
            "Word limit exceeded (max {})",
            MAX_WORDS
        )));
    }
    Ok(())
}

/// Validate a stored salt field.
pub fn validate_salt(salt: &str) -> Result<()> {
    if salt.is_empty() {
        return Err(PadError::Validation("Salt cannot be empty".to_string()));
    }
    Ok(())
}

/// Count words the way clients report them: whitespace-separated runs.
pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(ciphertext: &str) -> EncryptedPayload {
        EncryptedPayload {
            ciphertext: ciphertext.to_string(),
            iv: "aXY=".to_string(),
            auth_tag: "dGFn".to_string(),
        }
    }

    #[test]
    fn test_valid_pad_hash() {
        assert!(validate_pad_hash(&"0123456789abcdef".repeat(4)).is_ok());
    }

    #[test]
    fn test_pad_hash_wrong_length() {
        assert!(validate_pad_hash("abc123").is_err());
        assert!(validate_pad_hash(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_pad_hash_rejects_uppercase_and_non_hex() {
        assert!(validate_pad_hash(&"A".repeat(64)).is_err());
        assert!(validate_pad_hash(&"g".repeat(64)).is_err());
        assert!(validate_pad_hash(&format!("{}!", "a".repeat(63))).is_err());
    }

    #[test]
    fn test_payload_empty_content_only_on_create() {
        assert!(validate_payload(&payload(""), true).is_ok());
        assert!(validate_payload(&payload(""), false).is_err());
        assert!(validate_payload(&payload("Y2lwaGVy"), false).is_ok());
    }

    #[test]
    fn test_payload_size_ceiling() {
        let oversize = "A".repeat(MAX_CONTENT_BYTES + 1);
        assert!(validate_payload(&payload(&oversize), false).is_err());
    }

    #[test]
    fn test_payload_missing_fields() {
        let mut p = payload("Y2lwaGVy");
        p.iv = String::new();
        assert!(validate_payload(&p, false).is_err());

        let mut p = payload("Y2lwaGVy");
        p.auth_tag = String::new();
        assert!(validate_payload(&p, false).is_err());
    }

    #[test]
    fn test_word_count_cap() {
        assert!(validate_word_count(0).is_ok());
        assert!(validate_word_count(MAX_WORDS).is_ok());
        assert!(validate_word_count(MAX_WORDS + 1).is_err());
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("one two\tthree\nfour"), 4);
        assert_eq!(count_words("  padded   out  "), 2);
    }
}
