//! The logical operation surface exposed to clients.
//!
//! `PadService` wraps a [`PadStore`] with request validation, admission
//! control, and sweep authorization. It is transport-agnostic: an HTTP
//! layer or a CLI maps its requests and errors one-to-one. Request and
//! response types serialize with camelCase wire names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::EncryptedPayload;
use crate::error::{PadError, Result};
use crate::limit::RateLimiter;
use crate::storage::{NewPad, Pad, PadLookup, PadStore, PadUpdate, Revision};
use crate::validation;

/// Request to create a pad.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePadRequest {
    pub pad_hash: String,
    pub payload: EncryptedPayload,
    pub salt: String,
    pub word_count: u32,
    #[serde(default)]
    pub is_locked: bool,
}

/// Request to update a pad's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePadRequest {
    pub pad_id: Uuid,
    pub payload: EncryptedPayload,
    pub word_count: u32,
    pub is_locked: bool,
    #[serde(default)]
    pub self_destruct_at: Option<DateTime<Utc>>,
    pub expected_version: i64,
}

/// Request to change a pad's self-destruct setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdateRequest {
    pub pad_id: Uuid,
    pub self_destruct_at: Option<DateTime<Utc>>,
}

/// Request to restore a revision onto its pad.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRevisionRequest {
    pub pad_id: Uuid,
    pub revision_id: Uuid,
    pub expected_version: i64,
}

/// Transport-agnostic pad operations over a [`PadStore`].
pub struct PadService<S: PadStore> {
    store: S,
    limiter: RateLimiter,
    sweep_secret: Option<String>,
}

impl<S: PadStore> PadService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            limiter: RateLimiter::new(),
            sweep_secret: None,
        }
    }

    /// Require `secret` for [`PadService::trigger_sweep`]. Without this,
    /// the sweep runs unauthenticated.
    pub fn with_sweep_secret(mut self, secret: impl Into<String>) -> Self {
        self.sweep_secret = Some(secret.into());
        self
    }

    /// Create a pad.
    ///
    /// `client_key` identifies the caller for admission control (e.g. a
    /// client address); creates are the one operation cheap enough to
    /// spam and expensive enough to store, so they are the gated path.
    ///
    /// # Errors
    ///
    /// - `PadError::Validation` before anything else
    /// - `PadError::RateLimited` when the client's bucket is empty
    /// - `PadError::AlreadyExists` on a pad-hash collision
    pub fn create_pad(&self, client_key: &str, request: &CreatePadRequest) -> Result<Pad> {
        validation::validate_pad_hash(&request.pad_hash)?;
        validation::validate_payload(&request.payload, true)?;
        validation::validate_salt(&request.salt)?;
        validation::validate_word_count(request.word_count)?;

        if !self.limiter.check(&format!("pad_create:{}", client_key)) {
            return Err(PadError::RateLimited);
        }

        let new_pad = NewPad::new(
            request.pad_hash.clone(),
            request.payload.clone(),
            request.salt.clone(),
            request.word_count,
        )
        .locked(request.is_locked);

        self.store.create(&new_pad)
    }

    /// Look up a pad by its code hash.
    ///
    /// Returns `Expired` (and deletes the row) for a pad whose
    /// self-destruct time has passed; `NotFound` for a hash that was
    /// never stored - the client can tell the two apart.
    pub fn open_pad(&self, pad_hash: &str) -> Result<PadLookup> {
        validation::validate_pad_hash(pad_hash)?;
        self.store.lookup(pad_hash, Utc::now())
    }

    /// Update a pad's content, carrying the caller's version token.
    pub fn update_pad(&self, request: &UpdatePadRequest) -> Result<Pad> {
        validation::validate_payload(&request.payload, false)?;
        validation::validate_word_count(request.word_count)?;

        let mut update = PadUpdate::new(
            request.payload.clone(),
            request.word_count,
            request.is_locked,
            request.expected_version,
        );
        if let Some(at) = request.self_destruct_at {
            update = update.with_self_destruct_at(at);
        }

        self.store.update(request.pad_id, &update)
    }

    /// Set or clear a pad's self-destruct time.
    pub fn update_settings(&self, request: &SettingsUpdateRequest) -> Result<Pad> {
        self.store
            .update_settings(request.pad_id, request.self_destruct_at)
    }

    /// List a pad's revisions, newest first.
    pub fn list_revisions(&self, pad_id: Uuid) -> Result<Vec<Revision>> {
        self.store.list_revisions(pad_id)
    }

    /// Restore a revision onto its pad.
    pub fn restore_revision(&self, request: &RestoreRevisionRequest) -> Result<Pad> {
        self.store.restore_revision(
            request.pad_id,
            request.revision_id,
            request.expected_version,
        )
    }

    /// Delete all revisions for a pad.
    pub fn clear_revisions(&self, pad_id: Uuid) -> Result<()> {
        self.store.clear_revisions(pad_id)
    }

    /// Run the expiry sweep, deleting every pad whose self-destruct time
    /// has passed. Returns the number of pads deleted.
    ///
    /// # Errors
    ///
    /// Returns `PadError::Unauthorized` when a sweep secret is configured
    /// and `provided_secret` is missing or does not match.
    pub fn trigger_sweep(&self, provided_secret: Option<&str>) -> Result<u64> {
        if let Some(expected) = &self.sweep_secret {
            match provided_secret {
                Some(provided) if provided == expected => {}
                _ => return Err(PadError::Unauthorized),
            }
        }
        self.store.sweep_expired(Utc::now())
    }
}
