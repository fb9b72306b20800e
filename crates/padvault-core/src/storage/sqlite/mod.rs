//! SQLite pad store.
//!
//! Rows hold opaque encrypted payloads; this backend owns consistency,
//! not content. Every content mutation runs inside a single transaction
//! that snapshots the prior payload into the revision ledger, trims the
//! ledger, and performs the guarded overwrite - all-or-nothing.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{PadError, Result};
use crate::storage::traits::PadStore;
use crate::storage::types::{NewPad, Pad, PadLookup, PadUpdate, Revision, REVISION_HISTORY_LIMIT};

use row::{fmt_ts, PadRow, RevisionRow};

/// Bounded retries for transient SQLite contention on mutating calls.
/// Domain failures (`Conflict`, `NotFound`) are terminal and never retried.
const MAX_BUSY_RETRIES: u32 = 3;

const PAD_COLUMNS: &str = "id, pad_hash, encrypted_content, salt, iv, auth_tag, \
                           word_count, is_locked, self_destruct_at, version, \
                           created_at, updated_at";

const REVISION_COLUMNS: &str = "id, pad_id, encrypted_content, iv, auth_tag, created_at";

/// SQLite-backed pad store.
pub struct SqlitePadStore {
    conn: Mutex<Connection>,
}

impl SqlitePadStore {
    /// Open (or create) a pad store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store. Used by tests; the data dies with the
    /// connection.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_millis(250))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pads (
                id TEXT PRIMARY KEY,
                pad_hash TEXT NOT NULL UNIQUE,
                encrypted_content TEXT NOT NULL,
                salt TEXT NOT NULL,
                iv TEXT NOT NULL,
                auth_tag TEXT NOT NULL,
                word_count INTEGER NOT NULL DEFAULT 0,
                is_locked INTEGER NOT NULL DEFAULT 0,
                self_destruct_at TEXT,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS pads_pad_hash_idx
            ON pads (pad_hash);

            CREATE INDEX IF NOT EXISTS pads_self_destruct_at_idx
            ON pads (self_destruct_at);

            CREATE TABLE IF NOT EXISTS revisions (
                id TEXT PRIMARY KEY,
                pad_id TEXT NOT NULL,
                encrypted_content TEXT NOT NULL,
                iv TEXT NOT NULL,
                auth_tag TEXT NOT NULL,
                created_at TEXT NOT NULL,

                FOREIGN KEY (pad_id) REFERENCES pads(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS revisions_pad_id_idx
            ON revisions (pad_id);
            "#,
        )?;

        Ok(())
    }

    /// Lock the database connection, returning an error if the mutex is
    /// poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PadError::Storage("SQLite connection poisoned".to_string()))
    }

    fn map_pad_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PadRow> {
        Ok(PadRow {
            id: row.get(0)?,
            pad_hash: row.get(1)?,
            encrypted_content: row.get(2)?,
            salt: row.get(3)?,
            iv: row.get(4)?,
            auth_tag: row.get(5)?,
            word_count: row.get(6)?,
            is_locked: row.get(7)?,
            self_destruct_at: row.get(8)?,
            version: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn map_revision_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RevisionRow> {
        Ok(RevisionRow {
            id: row.get(0)?,
            pad_id: row.get(1)?,
            encrypted_content: row.get(2)?,
            iv: row.get(3)?,
            auth_tag: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn pad_by_id(conn: &Connection, pad_id: Uuid) -> Result<Option<Pad>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM pads WHERE id = ?", PAD_COLUMNS),
                [pad_id.to_string()],
                Self::map_pad_row,
            )
            .optional()?;
        row.map(TryInto::try_into).transpose()
    }

    fn pad_by_hash(conn: &Connection, pad_hash: &str) -> Result<Option<Pad>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM pads WHERE pad_hash = ?", PAD_COLUMNS),
                [pad_hash],
                Self::map_pad_row,
            )
            .optional()?;
        row.map(TryInto::try_into).transpose()
    }

    /// Snapshot a pad's current payload into the revision ledger.
    fn insert_revision(conn: &Connection, pad: &Pad) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO revisions (id, pad_id, encrypted_content, iv, auth_tag, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            (
                Uuid::new_v4().to_string(),
                pad.id.to_string(),
                &pad.encrypted_content,
                &pad.iv,
                &pad.auth_tag,
                fmt_ts(Utc::now()),
            ),
        )?;
        Ok(())
    }

    /// Evict the oldest revisions beyond the retention limit.
    fn trim_revisions(conn: &Connection, pad_id: Uuid) -> Result<()> {
        // rowid breaks ties between revisions created in the same microsecond
        conn.execute(
            r#"
            DELETE FROM revisions
            WHERE pad_id = ?1
              AND id NOT IN (
                  SELECT id FROM revisions
                  WHERE pad_id = ?1
                  ORDER BY created_at DESC, rowid DESC
                  LIMIT ?2
              )
            "#,
            rusqlite::params![pad_id.to_string(), REVISION_HISTORY_LIMIT as i64],
        )?;
        Ok(())
    }

    fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    fn is_contention(err: &PadError) -> bool {
        matches!(
            err,
            PadError::Sqlite {
                source: rusqlite::Error::SqliteFailure(e, _),
            } if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
        )
    }

    fn retry_contention<T>(mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempts = 0;
        loop {
            match op() {
                Err(err) if Self::is_contention(&err) && attempts < MAX_BUSY_RETRIES => {
                    attempts += 1;
                    std::thread::sleep(Duration::from_millis(20 * u64::from(attempts)));
                }
                other => return other,
            }
        }
    }

    fn update_tx(&self, pad_id: Uuid, update: &PadUpdate) -> Result<Pad> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let current = Self::pad_by_id(&tx, pad_id)?
            .ok_or_else(|| PadError::NotFound(format!("pad {}", pad_id)))?;
        if current.version != update.expected_version {
            return Err(PadError::Conflict);
        }

        Self::insert_revision(&tx, &current)?;
        Self::trim_revisions(&tx, pad_id)?;

        let changed = tx.execute(
            r#"
            UPDATE pads
            SET encrypted_content = ?,
                iv = ?,
                auth_tag = ?,
                word_count = ?,
                is_locked = ?,
                self_destruct_at = ?,
                version = version + 1,
                updated_at = ?
            WHERE id = ? AND version = ?
            "#,
            (
                &update.payload.ciphertext,
                &update.payload.iv,
                &update.payload.auth_tag,
                update.word_count,
                update.is_locked,
                update.self_destruct_at.map(fmt_ts),
                fmt_ts(Utc::now()),
                pad_id.to_string(),
                update.expected_version,
            ),
        )?;
        if changed == 0 {
            return Err(PadError::Conflict);
        }

        let updated = Self::pad_by_id(&tx, pad_id)?
            .ok_or_else(|| PadError::Storage("Updated pad disappeared".to_string()))?;
        tx.commit()?;

        Ok(updated)
    }

    fn restore_tx(&self, pad_id: Uuid, revision_id: Uuid, expected_version: i64) -> Result<Pad> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let current = Self::pad_by_id(&tx, pad_id)?
            .ok_or_else(|| PadError::NotFound(format!("pad {}", pad_id)))?;
        if current.version != expected_version {
            return Err(PadError::Conflict);
        }

        let revision = tx
            .query_row(
                &format!(
                    "SELECT {} FROM revisions WHERE id = ? AND pad_id = ?",
                    REVISION_COLUMNS
                ),
                (revision_id.to_string(), pad_id.to_string()),
                Self::map_revision_row,
            )
            .optional()?
            .map(Revision::try_from)
            .transpose()?
            .ok_or_else(|| PadError::NotFound(format!("revision {}", revision_id)))?;

        // The state being replaced must itself be recoverable
        Self::insert_revision(&tx, &current)?;
        Self::trim_revisions(&tx, pad_id)?;

        let changed = tx.execute(
            r#"
            UPDATE pads
            SET encrypted_content = ?,
                iv = ?,
                auth_tag = ?,
                version = version + 1,
                updated_at = ?
            WHERE id = ? AND version = ?
            "#,
            (
                &revision.encrypted_content,
                &revision.iv,
                &revision.auth_tag,
                fmt_ts(Utc::now()),
                pad_id.to_string(),
                expected_version,
            ),
        )?;
        if changed == 0 {
            return Err(PadError::Conflict);
        }

        let updated = Self::pad_by_id(&tx, pad_id)?
            .ok_or_else(|| PadError::Storage("Restored pad disappeared".to_string()))?;
        tx.commit()?;

        Ok(updated)
    }
}

impl PadStore for SqlitePadStore {
    fn create(&self, new_pad: &NewPad) -> Result<Pad> {
        let conn = self.lock_conn()?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let result = conn.execute(
            r#"
            INSERT INTO pads (
                id,
                pad_hash,
                encrypted_content,
                salt,
                iv,
                auth_tag,
                word_count,
                is_locked,
                version,
                created_at,
                updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
            (
                id.to_string(),
                &new_pad.pad_hash,
                &new_pad.payload.ciphertext,
                &new_pad.salt,
                &new_pad.payload.iv,
                &new_pad.payload.auth_tag,
                new_pad.word_count,
                new_pad.is_locked,
                fmt_ts(now),
                fmt_ts(now),
            ),
        );

        // The UNIQUE constraint on pad_hash is the uniqueness check; there
        // is no prior read that a racing create could slip past.
        match result {
            Ok(_) => {}
            Err(e) if Self::is_unique_violation(&e) => return Err(PadError::AlreadyExists),
            Err(e) => return Err(e.into()),
        }

        Self::pad_by_id(&conn, id)?
            .ok_or_else(|| PadError::Storage("Created pad disappeared".to_string()))
    }

    fn lookup(&self, pad_hash: &str, now: DateTime<Utc>) -> Result<PadLookup> {
        let conn = self.lock_conn()?;

        let pad = match Self::pad_by_hash(&conn, pad_hash)? {
            Some(pad) => pad,
            None => return Ok(PadLookup::NotFound),
        };

        if let Some(at) = pad.self_destruct_at {
            if at <= now {
                // Idempotent predicate delete; racing with the sweep on the
                // same row is a no-op for the loser.
                conn.execute(
                    "DELETE FROM pads
                     WHERE id = ? AND self_destruct_at IS NOT NULL AND self_destruct_at <= ?",
                    (pad.id.to_string(), fmt_ts(now)),
                )?;
                return Ok(PadLookup::Expired);
            }
        }

        Ok(PadLookup::Found(pad))
    }

    fn update(&self, pad_id: Uuid, update: &PadUpdate) -> Result<Pad> {
        Self::retry_contention(|| self.update_tx(pad_id, update))
    }

    fn update_settings(
        &self,
        pad_id: Uuid,
        self_destruct_at: Option<DateTime<Utc>>,
    ) -> Result<Pad> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            r#"
            UPDATE pads
            SET self_destruct_at = ?,
                version = version + 1,
                updated_at = ?
            WHERE id = ?
            "#,
            (
                self_destruct_at.map(fmt_ts),
                fmt_ts(Utc::now()),
                pad_id.to_string(),
            ),
        )?;
        if changed == 0 {
            return Err(PadError::NotFound(format!("pad {}", pad_id)));
        }

        let updated = Self::pad_by_id(&tx, pad_id)?
            .ok_or_else(|| PadError::Storage("Updated pad disappeared".to_string()))?;
        tx.commit()?;

        Ok(updated)
    }

    fn list_revisions(&self, pad_id: Uuid) -> Result<Vec<Revision>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM revisions WHERE pad_id = ? ORDER BY created_at DESC, rowid DESC",
            REVISION_COLUMNS
        ))?;
        let rows = stmt.query_map([pad_id.to_string()], Self::map_revision_row)?;

        let mut revisions = Vec::new();
        for row in rows {
            revisions.push(Revision::try_from(row?)?);
        }
        Ok(revisions)
    }

    fn restore_revision(
        &self,
        pad_id: Uuid,
        revision_id: Uuid,
        expected_version: i64,
    ) -> Result<Pad> {
        Self::retry_contention(|| self.restore_tx(pad_id, revision_id, expected_version))
    }

    fn clear_revisions(&self, pad_id: Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "DELETE FROM revisions WHERE pad_id = ?",
            [pad_id.to_string()],
        )?;
        Ok(())
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM pads WHERE self_destruct_at IS NOT NULL AND self_destruct_at <= ?",
            [fmt_ts(now)],
        )?;
        Ok(deleted as u64)
    }
}
