//! Signature storage: the persistent registry of file fingerprints.

pub mod sqlite;

use std::path::Path;

use crate::errors::Result;
use crate::signature::Signature;

/// Lifecycle of the registry file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// No database file (or a zero-length one left by an interrupted bootstrap).
    Absent,
    /// Database file exists and is expected to hold the schema.
    Initialized,
}

impl RegistryState {
    pub fn probe(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > 0 => Self::Initialized,
            _ => Self::Absent,
        }
    }
}

/// Storage trait: abstract backend for signature persistence.
///
/// `(digest, size)` is unique across the store; writes are upserts.
pub trait SignatureStore {
    /// Insert or replace one signature, committed before returning.
    fn put(&mut self, signature: &Signature) -> Result<()>;

    /// Upsert a batch in a single transaction. Returns the number written.
    fn put_all(&mut self, signatures: &[Signature]) -> Result<usize>;

    /// Check whether this exact `(digest, size)` pair is registered.
    fn contains(&self, signature: &Signature) -> Result<bool>;

    /// All signatures recorded with the given size.
    fn with_size(&self, size: u64) -> Result<Vec<Signature>>;

    /// Stream every stored signature to `visit`, in no particular order.
    /// An error from `visit` stops the walk and is returned.
    fn for_each(&self, visit: &mut dyn FnMut(Signature) -> Result<()>) -> Result<()>;

    /// Collect every stored signature.
    fn list_all(&self) -> Result<Vec<Signature>> {
        let mut out = Vec::new();
        self.for_each(&mut |sig| {
            out.push(sig);
            Ok(())
        })?;
        Ok(out)
    }

    /// Total signature count.
    fn count(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banish.db");
        assert_eq!(RegistryState::probe(&path), RegistryState::Absent);

        std::fs::write(&path, b"").unwrap();
        assert_eq!(RegistryState::probe(&path), RegistryState::Absent);

        std::fs::write(&path, b"x").unwrap();
        assert_eq!(RegistryState::probe(&path), RegistryState::Initialized);
    }
}
