//! banish — a local registry of file fingerprints.
//!
//! A file's fingerprint is its SHA-1 digest together with its byte length.
//! Registered fingerprints live in a SQLite database under the user's data
//! directory, so a file can later be recognized as already seen.

pub mod commands;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod signature;
pub mod storage;

pub use commands::{check, dump, register, scan, CheckOutcome, DumpFormat, ScanReport};
pub use config::{Config, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use errors::{BanishError, Result};
pub use signature::{Digest, Signature};
pub use storage::sqlite::SqliteRegistry;
pub use storage::{RegistryState, SignatureStore};
