//! Operations behind the command-line modes.
//!
//! Each operation opens the registry, does one unit of work and closes it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::crypto::batch::fingerprint_all;
use crate::crypto::hash::fingerprint_file;
use crate::errors::{BanishError, Result};
use crate::signature::Signature;
use crate::storage::sqlite::SqliteRegistry;
use crate::storage::{RegistryState, SignatureStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    /// `<hex-digest> <size>` per line.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Fingerprint `path` and record it in the registry.
///
/// The file is hashed before the store is touched, so an unreadable file
/// leaves the registry (and its directory) untouched.
pub fn register(config: &Config, path: &Path) -> Result<Signature> {
    let sig = fingerprint_file(path, config.chunk_size)?;
    let mut store = SqliteRegistry::open(config)?;
    store.put(&sig)?;
    store.close()?;
    tracing::info!(path = %path.display(), digest = %sig.digest, size = sig.size, "registered");
    Ok(sig)
}

/// Write every stored signature to `out`. Returns the number written.
pub fn dump<W: Write>(config: &Config, out: &mut W, format: DumpFormat) -> Result<usize> {
    let store = SqliteRegistry::open(config)?;
    let mut written = 0;
    store.for_each(&mut |sig| {
        match format {
            DumpFormat::Text => writeln!(out, "{sig}")?,
            DumpFormat::Json => {
                serde_json::to_writer(&mut *out, &sig)?;
                writeln!(out)?;
            }
        }
        written += 1;
        Ok(())
    })?;
    out.flush()?;
    store.close()?;
    Ok(written)
}

/// Outcome of a directory scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub registered: Vec<(PathBuf, Signature)>,
    pub failed: Vec<(PathBuf, BanishError)>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Register every regular file under `root`.
///
/// Symlinks are not followed. Files that cannot be read are reported in
/// [`ScanReport::failed`]; everything else is committed in one transaction.
pub fn scan(config: &Config, root: &Path) -> Result<ScanReport> {
    fs::metadata(root).map_err(|e| BanishError::file_access(root, e))?;

    let mut report = ScanReport::default();
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => paths.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                tracing::warn!(path = %path.display(), "skipping: {e}");
                report
                    .failed
                    .push((path.clone(), BanishError::file_access(path, e.into())));
            }
        }
    }
    tracing::debug!(root = %root.display(), files = paths.len(), "scanning");

    for (path, result) in fingerprint_all(paths, config.chunk_size) {
        match result {
            Ok(sig) => report.registered.push((path, sig)),
            Err(e) => {
                tracing::warn!(path = %path.display(), "skipping: {e}");
                report.failed.push((path, e));
            }
        }
    }

    let sigs: Vec<Signature> = report.registered.iter().map(|(_, s)| *s).collect();
    let mut store = SqliteRegistry::open(config)?;
    store.put_all(&sigs)?;
    store.close()?;
    Ok(report)
}

/// Result of looking a file up without registering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Known(Signature),
    /// Not registered. The signature is `None` when no stored entry shares
    /// the file's size, in which case the file was never hashed.
    Unknown(Option<Signature>),
}

/// Report whether `path` is already registered. Never writes to the store.
pub fn check(config: &Config, path: &Path) -> Result<CheckOutcome> {
    let meta = fs::metadata(path).map_err(|e| BanishError::file_access(path, e))?;
    if meta.is_dir() {
        return Err(BanishError::file_access(
            path,
            std::io::Error::other("is a directory"),
        ));
    }
    if RegistryState::probe(&config.database_path()) == RegistryState::Absent {
        return Ok(CheckOutcome::Unknown(None));
    }

    let store = SqliteRegistry::open(config)?;
    if store.with_size(meta.len())?.is_empty() {
        store.close()?;
        return Ok(CheckOutcome::Unknown(None));
    }

    let sig = fingerprint_file(path, config.chunk_size)?;
    let known = store.contains(&sig)?;
    store.close()?;
    Ok(if known {
        CheckOutcome::Known(sig)
    } else {
        CheckOutcome::Unknown(Some(sig))
    })
}
