//! Integration tests for the SQLite pad store: uniqueness, optimistic
//! concurrency, the revision ledger bound, and expiry.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use padvault_core::crypto::EncryptedPayload;
use padvault_core::error::PadError;
use padvault_core::storage::{
    NewPad, PadLookup, PadStore, PadUpdate, SqlitePadStore, REVISION_HISTORY_LIMIT,
};

fn payload(marker: &str) -> EncryptedPayload {
    // The store treats payload fields as opaque; markers make assertions
    // about which snapshot landed where readable.
    EncryptedPayload {
        ciphertext: format!("ct-{marker}"),
        iv: format!("iv-{marker}"),
        auth_tag: format!("tag-{marker}"),
    }
}

fn pad_hash(n: u64) -> String {
    format!("{:064x}", n)
}

fn new_pad(n: u64, marker: &str) -> NewPad {
    NewPad::new(pad_hash(n), payload(marker), "c2FsdA==", 2)
}

#[test]
fn test_create_returns_full_row() {
    let store = SqlitePadStore::open_in_memory().unwrap();

    let pad = store.create(&new_pad(1, "v0")).unwrap();

    assert!(!pad.id.is_nil());
    assert_eq!(pad.pad_hash, pad_hash(1));
    assert_eq!(pad.encrypted_content, "ct-v0");
    assert_eq!(pad.version, 1);
    assert_eq!(pad.word_count, 2);
    assert!(!pad.is_locked);
    assert!(pad.self_destruct_at.is_none());
}

#[test]
fn test_duplicate_create_fails_and_keeps_first_row() {
    let store = SqlitePadStore::open_in_memory().unwrap();

    let first = store.create(&new_pad(1, "first")).unwrap();
    let result = store.create(&new_pad(1, "second"));
    assert!(matches!(result, Err(PadError::AlreadyExists)));

    match store.lookup(&pad_hash(1), Utc::now()).unwrap() {
        PadLookup::Found(pad) => {
            assert_eq!(pad.id, first.id);
            assert_eq!(pad.encrypted_content, "ct-first");
        }
        other => panic!("expected Found, got {other:?}"),
    }
}

#[test]
fn test_lookup_unknown_hash_is_not_found() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let result = store.lookup(&pad_hash(42), Utc::now()).unwrap();
    assert!(matches!(result, PadLookup::NotFound));
}

#[test]
fn test_update_bumps_version_and_snapshots_previous_payload() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    let updated = store
        .update(pad.id, &PadUpdate::new(payload("v1"), 5, false, pad.version))
        .unwrap();

    assert_eq!(updated.version, 2);
    assert_eq!(updated.encrypted_content, "ct-v1");
    assert_eq!(updated.word_count, 5);
    assert!(updated.updated_at >= pad.updated_at);

    let revisions = store.list_revisions(pad.id).unwrap();
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0].encrypted_content, "ct-v0");
    assert_eq!(revisions[0].pad_id, pad.id);
}

#[test]
fn test_stale_version_conflicts_without_writing() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    store
        .update(pad.id, &PadUpdate::new(payload("v1"), 3, false, 1))
        .unwrap();

    // Second writer still presents version 1
    let result = store.update(pad.id, &PadUpdate::new(payload("v2"), 3, false, 1));
    assert!(matches!(result, Err(PadError::Conflict)));

    match store.lookup(&pad_hash(1), Utc::now()).unwrap() {
        PadLookup::Found(current) => {
            assert_eq!(current.encrypted_content, "ct-v1");
            assert_eq!(current.version, 2);
        }
        other => panic!("expected Found, got {other:?}"),
    }

    // The losing update must not have snapshotted anything either
    assert_eq!(store.list_revisions(pad.id).unwrap().len(), 1);
}

#[test]
fn test_racing_updates_exactly_one_wins() {
    let store = Arc::new(SqlitePadStore::open_in_memory().unwrap());
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    let handles: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|marker| {
            let store = Arc::clone(&store);
            let pad_id = pad.id;
            std::thread::spawn(move || {
                store.update(pad_id, &PadUpdate::new(payload(marker), 1, false, 1))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(PadError::Conflict)))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 1);

    // Final content comes from the winner
    let winner = results.into_iter().find_map(|r| r.ok()).unwrap();
    match store.lookup(&pad_hash(1), Utc::now()).unwrap() {
        PadLookup::Found(current) => {
            assert_eq!(current.encrypted_content, winner.encrypted_content);
            assert_eq!(current.version, 2);
        }
        other => panic!("expected Found, got {other:?}"),
    }
}

#[test]
fn test_update_unknown_pad_is_not_found() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let result = store.update(Uuid::new_v4(), &PadUpdate::new(payload("x"), 1, false, 1));
    assert!(matches!(result, Err(PadError::NotFound(_))));
}

#[test]
fn test_revision_ledger_keeps_five_most_recent() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    // Eight updates snapshot v0..v7; only the five most recent survive
    let mut version = pad.version;
    for i in 1..=8 {
        let updated = store
            .update(
                pad.id,
                &PadUpdate::new(payload(&format!("v{i}")), 1, false, version),
            )
            .unwrap();
        version = updated.version;
    }

    let revisions = store.list_revisions(pad.id).unwrap();
    assert_eq!(revisions.len(), REVISION_HISTORY_LIMIT);

    let markers: Vec<_> = revisions
        .iter()
        .map(|r| r.encrypted_content.as_str())
        .collect();
    assert_eq!(markers, vec!["ct-v7", "ct-v6", "ct-v5", "ct-v4", "ct-v3"]);
}

#[test]
fn test_restore_swaps_payload_and_snapshots_replaced_state() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    let after_first = store
        .update(pad.id, &PadUpdate::new(payload("v1"), 7, true, 1))
        .unwrap();

    // Restore the v0 snapshot
    let target = store.list_revisions(pad.id).unwrap()[0].clone();
    let restored = store
        .restore_revision(pad.id, target.id, after_first.version)
        .unwrap();

    assert_eq!(restored.encrypted_content, "ct-v0");
    assert_eq!(restored.version, after_first.version + 1);
    // Restore replaces only the payload triple
    assert_eq!(restored.word_count, after_first.word_count);
    assert_eq!(restored.is_locked, after_first.is_locked);

    // The replaced v1 state is now itself a revision (newest first)
    let revisions = store.list_revisions(pad.id).unwrap();
    assert_eq!(revisions[0].encrypted_content, "ct-v1");
}

#[test]
fn test_restore_rejects_stale_version_and_foreign_revision() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad_a = store.create(&new_pad(1, "a0")).unwrap();
    let pad_b = store.create(&new_pad(2, "b0")).unwrap();

    store
        .update(pad_a.id, &PadUpdate::new(payload("a1"), 1, false, 1))
        .unwrap();
    store
        .update(pad_b.id, &PadUpdate::new(payload("b1"), 1, false, 1))
        .unwrap();

    let revision_a = store.list_revisions(pad_a.id).unwrap()[0].clone();
    let revision_b = store.list_revisions(pad_b.id).unwrap()[0].clone();

    // Stale token
    let result = store.restore_revision(pad_a.id, revision_a.id, 1);
    assert!(matches!(result, Err(PadError::Conflict)));

    // Revision belonging to another pad
    let result = store.restore_revision(pad_a.id, revision_b.id, 2);
    assert!(matches!(result, Err(PadError::NotFound(_))));

    // Unknown revision
    let result = store.restore_revision(pad_a.id, Uuid::new_v4(), 2);
    assert!(matches!(result, Err(PadError::NotFound(_))));
}

#[test]
fn test_clear_revisions_leaves_pad_intact() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    store
        .update(pad.id, &PadUpdate::new(payload("v1"), 1, false, 1))
        .unwrap();
    assert_eq!(store.list_revisions(pad.id).unwrap().len(), 1);

    store.clear_revisions(pad.id).unwrap();
    assert!(store.list_revisions(pad.id).unwrap().is_empty());

    match store.lookup(&pad_hash(1), Utc::now()).unwrap() {
        PadLookup::Found(current) => assert_eq!(current.encrypted_content, "ct-v1"),
        other => panic!("expected Found, got {other:?}"),
    }
}

#[test]
fn test_settings_update_creates_no_revision() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    let at = Utc::now() + Duration::hours(2);
    let updated = store.update_settings(pad.id, Some(at)).unwrap();

    assert_eq!(
        updated.self_destruct_at.unwrap().timestamp_micros(),
        at.timestamp_micros()
    );
    assert_eq!(updated.version, 2);
    assert!(store.list_revisions(pad.id).unwrap().is_empty());

    // Clearing works too
    let cleared = store.update_settings(pad.id, None).unwrap();
    assert!(cleared.self_destruct_at.is_none());
    assert_eq!(cleared.version, 3);
}

#[test]
fn test_settings_update_unknown_pad_is_not_found() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let result = store.update_settings(Uuid::new_v4(), None);
    assert!(matches!(result, Err(PadError::NotFound(_))));
}

#[test]
fn test_lookup_lazily_expires_and_cascades() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();
    store
        .update(pad.id, &PadUpdate::new(payload("v1"), 1, false, 1))
        .unwrap();

    let past = Utc::now() - Duration::minutes(5);
    store.update_settings(pad.id, Some(past)).unwrap();

    // First lookup reports Expired and deletes the row
    let result = store.lookup(&pad_hash(1), Utc::now()).unwrap();
    assert!(matches!(result, PadLookup::Expired));

    // Thereafter the pad never existed as far as lookup is concerned
    let result = store.lookup(&pad_hash(1), Utc::now()).unwrap();
    assert!(matches!(result, PadLookup::NotFound));

    // Revisions went with the pad
    assert!(store.list_revisions(pad.id).unwrap().is_empty());
}

#[test]
fn test_lookup_boundary_is_at_or_before_now() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let pad = store.create(&new_pad(1, "v0")).unwrap();

    let at = Utc::now();
    store.update_settings(pad.id, Some(at)).unwrap();

    // Exactly at the destruct time counts as expired
    let result = store.lookup(&pad_hash(1), at).unwrap();
    assert!(matches!(result, PadLookup::Expired));
}

#[test]
fn test_sweep_deletes_only_expired_and_is_idempotent() {
    let store = SqlitePadStore::open_in_memory().unwrap();
    let now = Utc::now();

    let expired = store.create(&new_pad(1, "expired")).unwrap();
    store
        .update_settings(expired.id, Some(now - Duration::minutes(1)))
        .unwrap();

    let future = store.create(&new_pad(2, "future")).unwrap();
    store
        .update_settings(future.id, Some(now + Duration::hours(1)))
        .unwrap();

    // Third pad has no self-destruct at all
    store.create(&new_pad(3, "forever")).unwrap();

    assert_eq!(store.sweep_expired(now).unwrap(), 1);
    assert_eq!(store.sweep_expired(now).unwrap(), 0);

    assert!(matches!(
        store.lookup(&pad_hash(1), now).unwrap(),
        PadLookup::NotFound
    ));
    assert!(matches!(
        store.lookup(&pad_hash(2), now).unwrap(),
        PadLookup::Found(_)
    ));
    assert!(matches!(
        store.lookup(&pad_hash(3), now).unwrap(),
        PadLookup::Found(_)
    ));
}

#[test]
fn test_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pads.db");

    {
        let store = SqlitePadStore::open(&path).unwrap();
        store.create(&new_pad(1, "v0")).unwrap();
    }

    let store = SqlitePadStore::open(&path).unwrap();
    match store.lookup(&pad_hash(1), Utc::now()).unwrap() {
        PadLookup::Found(pad) => assert_eq!(pad.encrypted_content, "ct-v0"),
        other => panic!("expected Found, got {other:?}"),
    }
}
