//! Client-side cryptography for PadVault.
//!
//! Everything in this module runs on the client's side of the trust
//! boundary: codes are turned into keys here, plaintext is sealed here,
//! and only the resulting opaque payloads ever reach the storage layer.
//!
//! ## Architecture
//!
//! - **key**: code hashing, salt generation, and PBKDF2 key derivation
//! - **engine**: AES-256-GCM authenticated encryption, single layer and
//!   the nested "double lock" variant
//!
//! ## Security
//!
//! - The code itself is never stored or transmitted; the store only sees
//!   its SHA-256 digest (the lookup key) and ciphertext.
//! - Derived key material is zeroized on drop.
//! - Decryption is all-or-nothing: a failed authentication tag yields an
//!   error, never partial plaintext.

pub mod engine;
pub mod key;

pub use engine::{
    decrypt, decrypt_with_optional_lock, encrypt, encrypt_with_optional_lock, EncryptedPayload,
    LockedPayload,
};
pub use key::{decode_salt, derive_key, generate_salt, hash_code, DerivedKey};
