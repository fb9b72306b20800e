//! Error types for PadVault core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages.
//!
//! Decryption failures carry no detail on purpose: the caller must not be
//! able to tell a wrong primary code from a wrong lock code or a tampered
//! payload. `LockCodeRequired` is the one recoverable exception, raised
//! before any decryption is attempted.

use thiserror::Error;

/// Result type alias for PadVault operations.
pub type Result<T> = std::result::Result<T, PadError>;

/// Core error type for PadVault operations.
#[derive(Debug, Error)]
pub enum PadError {
    /// Authenticated decryption failed (wrong key, tampered or corrupted
    /// payload). Intentionally carries no cause.
    #[error("Decryption failed")]
    DecryptionFailed,

    /// A locked pad was opened without its lock code.
    #[error("Lock code required")]
    LockCodeRequired,

    /// Create attempted with a pad hash that is already taken.
    #[error("Pad already exists")]
    AlreadyExists,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stale version token on an optimistic-concurrency write
    #[error("Version conflict")]
    Conflict,

    /// Privileged operation attempted without a valid secret
    #[error("Unauthorized")]
    Unauthorized,

    /// Admission control rejected the request
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Encryption-layer error other than a failed decryption
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
