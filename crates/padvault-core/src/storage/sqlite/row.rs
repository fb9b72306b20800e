//! Raw row types for database queries, plus timestamp formatting.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{PadError, Result};
use crate::storage::types::{Pad, Revision};

/// Format a timestamp for storage.
///
/// Fixed-width UTC RFC 3339 (microsecond precision, `Z` suffix) so that
/// string comparison in SQL matches chronological order.
pub(super) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| PadError::Storage(format!("Invalid timestamp: {}", e)))
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| PadError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

/// Raw row data from the pads table, before parsing into domain types.
#[derive(Debug)]
pub(super) struct PadRow {
    pub id: String,
    pub pad_hash: String,
    pub encrypted_content: String,
    pub salt: String,
    pub iv: String,
    pub auth_tag: String,
    pub word_count: u32,
    pub is_locked: bool,
    pub self_destruct_at: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<PadRow> for Pad {
    type Error = PadError;

    fn try_from(row: PadRow) -> Result<Self> {
        Ok(Pad {
            id: parse_uuid(&row.id, "pad")?,
            pad_hash: row.pad_hash,
            encrypted_content: row.encrypted_content,
            salt: row.salt,
            iv: row.iv,
            auth_tag: row.auth_tag,
            word_count: row.word_count,
            is_locked: row.is_locked,
            self_destruct_at: row.self_destruct_at.as_deref().map(parse_ts).transpose()?,
            version: row.version,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
        })
    }
}

/// Raw row data from the revisions table.
#[derive(Debug)]
pub(super) struct RevisionRow {
    pub id: String,
    pub pad_id: String,
    pub encrypted_content: String,
    pub iv: String,
    pub auth_tag: String,
    pub created_at: String,
}

impl TryFrom<RevisionRow> for Revision {
    type Error = PadError;

    fn try_from(row: RevisionRow) -> Result<Self> {
        Ok(Revision {
            id: parse_uuid(&row.id, "revision")?,
            pad_id: parse_uuid(&row.pad_id, "pad")?,
            encrypted_content: row.encrypted_content,
            iv: row.iv,
            auth_tag: row.auth_tag,
            created_at: parse_ts(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_ts_fixed_width_orders_lexicographically() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::milliseconds(1);

        let a = fmt_ts(earlier);
        let b = fmt_ts(later);
        assert!(a < b);
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_fmt_parse_round_trip() {
        let now = Utc::now();
        let parsed = parse_ts(&fmt_ts(now)).unwrap();
        // Microsecond precision is what survives storage
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }
}
