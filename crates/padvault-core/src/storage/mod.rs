//! Storage abstraction for PadVault.
//!
//! This module defines the `PadStore` trait and core types for the
//! versioned, self-destructing pad store.
//!
//! ## Architecture
//!
//! The store never sees plaintext or keys: rows hold opaque base64
//! payload triples produced by the crypto layer on the client side.
//! What the store *does* own is consistency:
//!
//! - optimistic concurrency via an explicit per-pad version counter
//! - a bounded revision ledger, snapshotted and trimmed inside the same
//!   transaction as every content write
//! - timed self-destruction, enforced lazily on lookup and in bulk by
//!   the expiry sweep

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::SqlitePadStore;
pub use traits::PadStore;
pub use types::{NewPad, Pad, PadLookup, PadUpdate, Revision, REVISION_HISTORY_LIMIT};
