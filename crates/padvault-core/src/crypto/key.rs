//! Key derivation from pad codes.
//!
//! A pad code is the only secret a user holds, and it may be low-entropy,
//! so keys are derived with a deliberately slow iterated construction
//! (PBKDF2-HMAC-SHA-256) to make offline brute force against a stolen
//! payload expensive.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pbkdf2::pbkdf2_hmac_array;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

use crate::error::{PadError, Result};

/// PBKDF2 round count. Matches the OWASP floor for HMAC-SHA-256.
const PBKDF2_ITERATIONS: u32 = 210_000;

/// Length of derived key in bytes (256 bits for AES-256-GCM).
const KEY_LENGTH: usize = 32;

/// Length of a freshly generated salt in bytes.
const SALT_LENGTH: usize = 16;

/// A symmetric key derived from a pad code.
///
/// Key material is zeroized from memory when dropped, reducing the
/// window of exposure.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// Avoid storing or logging this value. Use only for immediate
    /// encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a pad code using PBKDF2-HMAC-SHA-256.
///
/// # Arguments
///
/// * `code` - The user's secret code
/// * `salt` - Random salt (fixed per pad, stored alongside the payload)
///
/// # Security
///
/// - Same code + salt always produces the same key (deterministic)
/// - Different salt produces an unrelated key even for the same code
/// - 210,000 rounds; derivation is intentionally slow
///
/// # Examples
///
/// ```
/// use padvault_core::crypto::derive_key;
///
/// let salt = b"unique-salt-16by";
/// let key = derive_key("my-pad-code", salt).unwrap();
/// // Use key for encryption...
/// ```
pub fn derive_key(code: &str, salt: &[u8]) -> Result<DerivedKey> {
    if code.is_empty() {
        return Err(PadError::Validation("Code cannot be empty".to_string()));
    }

    if salt.len() < SALT_LENGTH {
        return Err(PadError::Validation(format!(
            "Salt must be at least {} bytes",
            SALT_LENGTH
        )));
    }

    let key_bytes =
        pbkdf2_hmac_array::<Sha256, KEY_LENGTH>(code.as_bytes(), salt, PBKDF2_ITERATIONS);

    Ok(DerivedKey::from_bytes(key_bytes))
}

/// Hash a pad code into its public lookup identifier.
///
/// Returns the SHA-256 digest of the code as 64 lowercase hex characters.
/// This is an identifier, not key material: it is the only code-derived
/// value the storage layer ever sees, and it cannot be reversed to the
/// code.
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Generate a fresh random salt, base64-encoded for storage.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Decode a stored base64 salt back into raw bytes.
pub fn decode_salt(salt: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(salt)
        .map_err(|_| PadError::Validation("Salt is not valid base64".to_string()))
}
