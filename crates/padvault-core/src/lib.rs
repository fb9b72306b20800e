//! # PadVault Core
//!
//! Core library for PadVault - zero-knowledge encrypted pads addressed
//! only by a secret code.
//!
//! The code never reaches the storage layer: clients hash it into a
//! lookup key and derive encryption keys from it locally, so the store
//! only ever holds ciphertext. Writes are versioned with optimistic
//! concurrency, every content write snapshots the prior payload into a
//! bounded revision ledger, and pads can be given a self-destruct time.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, code hashing, single- and double-layer
//!   authenticated encryption (client side of the trust boundary)
//! - **storage**: the `PadStore` trait and SQLite backend (server side;
//!   handles opaque payloads only)
//! - **service**: validation, admission control, and sweep authorization
//!   over a store - the transport-agnostic operation surface
//! - **validation**: request shape and size limits
//! - **limit**: per-client token-bucket admission gate

pub mod crypto;
pub mod error;
pub mod limit;
pub mod service;
pub mod storage;
pub mod validation;

pub use error::{PadError, Result};
pub use service::PadService;
pub use storage::{PadStore, SqlitePadStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
