//! Core data types for the pad storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::EncryptedPayload;

/// Maximum revisions retained per pad; older ones are evicted oldest-first.
pub const REVISION_HISTORY_LIMIT: usize = 5;

/// A stored pad: an encrypted note addressed only by the hash of its code.
///
/// The payload fields (`encrypted_content`, `iv`, `auth_tag`) are opaque to
/// the storage layer; it never inspects their structure. `word_count` and
/// `is_locked` are client-supplied metadata, the latter purely advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pad {
    /// Server-generated identity, never derivable from the code
    pub id: Uuid,

    /// SHA-256 hex digest of the code; the sole external lookup key
    pub pad_hash: String,

    /// Base64 ciphertext
    pub encrypted_content: String,

    /// Base64 salt, generated once at creation, fixed for the pad's lifetime
    pub salt: String,

    /// Base64 96-bit nonce
    pub iv: String,

    /// Base64 128-bit authentication tag
    pub auth_tag: String,

    /// Plaintext word count, disclosed for quota/UX purposes only
    pub word_count: u32,

    /// Client-set flag: payload is double-encrypted
    pub is_locked: bool,

    /// When set and in the past, the pad is due for deletion
    pub self_destruct_at: Option<DateTime<Utc>>,

    /// Optimistic-concurrency token; incremented by every mutation
    pub version: i64,

    /// When this pad was created
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation (informational; `version` is the token)
    pub updated_at: DateTime<Utc>,
}

impl Pad {
    /// The pad's payload triple as an [`EncryptedPayload`].
    pub fn payload(&self) -> EncryptedPayload {
        EncryptedPayload {
            ciphertext: self.encrypted_content.clone(),
            iv: self.iv.clone(),
            auth_tag: self.auth_tag.clone(),
        }
    }
}

/// A retained snapshot of a pad's encrypted payload.
///
/// Revisions store only the payload triple: `word_count` and `is_locked`
/// stay on the pad and are unaffected by a restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: Uuid,

    /// Owning pad; revisions are deleted with it
    pub pad_id: Uuid,

    pub encrypted_content: String,
    pub iv: String,
    pub auth_tag: String,
    pub created_at: DateTime<Utc>,
}

impl Revision {
    /// The revision's payload triple as an [`EncryptedPayload`].
    pub fn payload(&self) -> EncryptedPayload {
        EncryptedPayload {
            ciphertext: self.encrypted_content.clone(),
            iv: self.iv.clone(),
            auth_tag: self.auth_tag.clone(),
        }
    }
}

/// Builder for creating a new pad.
#[derive(Debug, Clone)]
pub struct NewPad {
    pub pad_hash: String,
    pub payload: EncryptedPayload,
    pub salt: String,
    pub word_count: u32,
    pub is_locked: bool,
}

impl NewPad {
    pub fn new(
        pad_hash: impl Into<String>,
        payload: EncryptedPayload,
        salt: impl Into<String>,
        word_count: u32,
    ) -> Self {
        Self {
            pad_hash: pad_hash.into(),
            payload,
            salt: salt.into(),
            word_count,
            is_locked: false,
        }
    }

    pub fn locked(mut self, is_locked: bool) -> Self {
        self.is_locked = is_locked;
        self
    }
}

/// A full content update for an existing pad.
///
/// `expected_version` must match the pad's current version or the update
/// fails with `Conflict` and writes nothing.
#[derive(Debug, Clone)]
pub struct PadUpdate {
    pub payload: EncryptedPayload,
    pub word_count: u32,
    pub is_locked: bool,
    pub self_destruct_at: Option<DateTime<Utc>>,
    pub expected_version: i64,
}

impl PadUpdate {
    pub fn new(
        payload: EncryptedPayload,
        word_count: u32,
        is_locked: bool,
        expected_version: i64,
    ) -> Self {
        Self {
            payload,
            word_count,
            is_locked,
            self_destruct_at: None,
            expected_version,
        }
    }

    pub fn with_self_destruct_at(mut self, at: DateTime<Utc>) -> Self {
        self.self_destruct_at = Some(at);
        self
    }
}

/// Outcome of looking a pad up by its hash.
///
/// `Expired` is distinct from `NotFound` so the client can tell "this pad
/// self-destructed" from "this pad never existed".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "pad", rename_all = "snake_case")]
pub enum PadLookup {
    Found(Pad),
    NotFound,
    Expired,
}
