//! Pad store trait definition.
//!
//! The `PadStore` trait defines the interface the service layer works
//! against. The storage backend only ever handles opaque encrypted
//! payloads; nothing behind this trait can read pad content.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{NewPad, Pad, PadLookup, PadUpdate, Revision};
use crate::error::Result;

/// Storage interface for encrypted pads.
///
/// All implementations must ensure:
/// - `pad_hash` uniqueness is enforced by the storage layer itself, not by
///   a read-then-write
/// - Every content mutation snapshots the prior payload into the revision
///   ledger and trims it, atomically with the write
/// - Version comparison and the write are a single atomic step, so of two
///   racing writers exactly one can win
pub trait PadStore: Send + Sync {
    /// Create a new pad.
    ///
    /// # Errors
    ///
    /// Returns `PadError::AlreadyExists` if a pad with the same hash
    /// exists. The losing call of a create race gets the same error; the
    /// stored row is always the winner's.
    fn create(&self, new_pad: &NewPad) -> Result<Pad>;

    /// Look up a pad by its code hash.
    ///
    /// A pad whose `self_destruct_at` is at or before `now` is deleted as
    /// part of answering and reported as `Expired` - lazy expiry, in
    /// addition to [`PadStore::sweep_expired`]. The delete is idempotent;
    /// racing with the sweep on the same row is harmless.
    fn lookup(&self, pad_hash: &str, now: DateTime<Utc>) -> Result<PadLookup>;

    /// Update a pad's content, with optimistic concurrency.
    ///
    /// Atomically: snapshot the pre-update payload as a revision, trim the
    /// ledger to [`REVISION_HISTORY_LIMIT`](super::REVISION_HISTORY_LIMIT),
    /// and overwrite the pad, bumping `version` and `updated_at`.
    ///
    /// # Errors
    ///
    /// - `PadError::NotFound` if the id is stale or the pad was reaped
    /// - `PadError::Conflict` if `expected_version` does not match the
    ///   current row; nothing is written
    fn update(&self, pad_id: Uuid, update: &PadUpdate) -> Result<Pad>;

    /// Update only the self-destruct time.
    ///
    /// Settings are not content: no revision is created. `version` and
    /// `updated_at` are still bumped.
    fn update_settings(
        &self,
        pad_id: Uuid,
        self_destruct_at: Option<DateTime<Utc>>,
    ) -> Result<Pad>;

    /// List a pad's revisions, newest first.
    fn list_revisions(&self, pad_id: Uuid) -> Result<Vec<Revision>>;

    /// Restore a revision onto the pad, with the same version gate as
    /// [`PadStore::update`].
    ///
    /// The current payload is snapshotted first so the replaced state is
    /// itself recoverable. `word_count` and `is_locked` are not touched.
    ///
    /// # Errors
    ///
    /// - `PadError::NotFound` if the pad is gone or the revision does not
    ///   belong to it
    /// - `PadError::Conflict` on a stale `expected_version`
    fn restore_revision(
        &self,
        pad_id: Uuid,
        revision_id: Uuid,
        expected_version: i64,
    ) -> Result<Pad>;

    /// Delete all revisions for a pad. The pad itself is untouched.
    fn clear_revisions(&self, pad_id: Uuid) -> Result<()>;

    /// Delete every pad whose `self_destruct_at` is at or before `now`,
    /// cascading to revisions. Returns the number of pads deleted.
    /// Idempotent: a second sweep with no new expirations deletes nothing.
    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
