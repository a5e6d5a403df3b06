//! Error types for banish.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BanishError {
    /// The file to fingerprint is missing, a directory, or unreadable.
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data directory or the database file cannot be created or opened.
    #[error("signature store unavailable at {}: {detail}", path.display())]
    StoreUnavailable { path: PathBuf, detail: String },

    /// The database file exists but does not hold the expected schema.
    #[error("signature store at {} is corrupt: {detail}", path.display())]
    StoreCorruption { path: PathBuf, detail: String },

    /// A write broke the `(digest, size)` uniqueness rule or a column range.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Bytes or hex text that do not form a 20-byte SHA-1 digest.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// The per-user data directory cannot be located.
    #[error("no home directory could be determined")]
    NoHomeDirectory,

    /// Any other I/O failure, such as writing dump output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a signature for JSON dump output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A SQLite failure not covered by the store variants above.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl BanishError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// True for failures tied to a single input file rather than the store.
    pub fn is_file_access(&self) -> bool {
        matches!(self, Self::FileAccess { .. })
    }
}

pub type Result<T> = std::result::Result<T, BanishError>;
