//! SQLite storage backend for the signature registry.
//!
//! Schema:
//! ```text
//! signatures (hash BLOB, size INTEGER)
//!   signatures_hashsize_idx  UNIQUE (hash, size)
//!   signatures_size_idx      (size)
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, Transaction};

use crate::config::Config;
use crate::errors::{BanishError, Result};
use crate::signature::{Digest, Signature};
use crate::storage::{RegistryState, SignatureStore};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS signatures (
        hash BLOB NOT NULL,
        size INTEGER NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS signatures_hashsize_idx ON signatures (hash, size);
    CREATE INDEX IF NOT EXISTS signatures_size_idx ON signatures (size);
";

/// Concurrent invocations wait this long on a locked database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed signature registry.
pub struct SqliteRegistry {
    conn: Connection,
    path: PathBuf,
}

impl SqliteRegistry {
    /// Open the registry described by `config`, creating the data directory
    /// and the schema on first use.
    pub fn open(config: &Config) -> Result<Self> {
        let dir = &config.data_directory;
        fs::create_dir_all(dir).map_err(|e| BanishError::StoreUnavailable {
            path: dir.clone(),
            detail: format!("creating data directory: {e}"),
        })?;
        Self::open_at(config.database_path())
    }

    /// Open a registry file directly. The parent directory must exist.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = RegistryState::probe(&path);

        let conn = Connection::open(&path).map_err(|e| BanishError::StoreUnavailable {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| classify(&path, e))?;

        let mut registry = Self { conn, path };
        match state {
            RegistryState::Absent => {
                tracing::debug!(path = %registry.path.display(), "creating signature store");
                registry.create_schema()?;
            }
            RegistryState::Initialized => registry.verify_schema()?,
        }
        Ok(registry)
    }

    /// Create an in-memory registry (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the underlying connection, reporting any error from SQLite.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| classify(&path, e))
    }

    fn create_schema(&mut self) -> Result<()> {
        let path = self.path.clone();
        let tx = self.conn.transaction().map_err(|e| classify(&path, e))?;
        tx.execute_batch(SCHEMA).map_err(|e| classify(&path, e))?;
        tx.commit().map_err(|e| classify(&path, e))?;
        Ok(())
    }

    fn verify_schema(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info('signatures')")
            .map_err(|e| classify(&self.path, e))?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .and_then(|rows| rows.collect())
            .map_err(|e| classify(&self.path, e))?;

        if columns.is_empty() {
            return Err(self.corruption("missing table 'signatures'"));
        }
        for required in ["hash", "size"] {
            if !columns.iter().any(|c| c == required) {
                return Err(self.corruption(&format!(
                    "table 'signatures' has no '{required}' column"
                )));
            }
        }
        Ok(())
    }

    fn corruption(&self, detail: &str) -> BanishError {
        BanishError::StoreCorruption {
            path: self.path.clone(),
            detail: detail.to_string(),
        }
    }

    fn decode(&self, hash: Vec<u8>, size: i64) -> Result<Signature> {
        let digest = Digest::from_slice(&hash)
            .map_err(|e| self.corruption(&format!("bad stored digest: {e}")))?;
        let size = u64::try_from(size)
            .map_err(|_| self.corruption(&format!("negative stored size {size}")))?;
        Ok(Signature::new(digest, size))
    }
}

/// Sort SQLite failures into the store error taxonomy.
fn classify(path: &Path, err: rusqlite::Error) -> BanishError {
    let code = match &err {
        rusqlite::Error::SqliteFailure(e, _) => Some(e.code),
        _ => None,
    };
    match code {
        Some(ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
            BanishError::StoreCorruption {
                path: path.to_path_buf(),
                detail: err.to_string(),
            }
        }
        Some(ErrorCode::ConstraintViolation) => BanishError::ConstraintViolation(err.to_string()),
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::DiskFull
            | ErrorCode::SystemIoFailure,
        ) => BanishError::StoreUnavailable {
            path: path.to_path_buf(),
            detail: err.to_string(),
        },
        _ => BanishError::Sqlite(err),
    }
}

fn size_param(size: u64) -> Result<i64> {
    i64::try_from(size)
        .map_err(|_| BanishError::ConstraintViolation(format!("size {size} exceeds INTEGER range")))
}

fn upsert(tx: &Transaction<'_>, path: &Path, sig: &Signature) -> Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO signatures (hash, size) VALUES (?1, ?2)",
        params![sig.digest.as_bytes(), size_param(sig.size)?],
    )
    .map_err(|e| classify(path, e))?;
    Ok(())
}

impl SignatureStore for SqliteRegistry {
    fn put(&mut self, signature: &Signature) -> Result<()> {
        self.put_all(std::slice::from_ref(signature)).map(|_| ())
    }

    fn put_all(&mut self, signatures: &[Signature]) -> Result<usize> {
        let path = self.path.clone();
        let tx = self.conn.transaction().map_err(|e| classify(&path, e))?;
        for sig in signatures {
            upsert(&tx, &path, sig)?;
        }
        tx.commit().map_err(|e| classify(&path, e))?;
        tracing::debug!(count = signatures.len(), "committed signatures");
        Ok(signatures.len())
    }

    fn contains(&self, signature: &Signature) -> Result<bool> {
        let exists: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM signatures WHERE hash = ?1 AND size = ?2)",
                params![signature.digest.as_bytes(), size_param(signature.size)?],
                |row| row.get(0),
            )
            .map_err(|e| classify(&self.path, e))?;
        Ok(exists)
    }

    fn with_size(&self, size: u64) -> Result<Vec<Signature>> {
        let mut stmt = self
            .conn
            .prepare("SELECT hash, size FROM signatures WHERE size = ?1")
            .map_err(|e| classify(&self.path, e))?;
        let rows: Vec<(Vec<u8>, i64)> = stmt
            .query_map(params![size_param(size)?], |row| Ok((row.get(0)?, row.get(1)?)))
            .and_then(|rows| rows.collect())
            .map_err(|e| classify(&self.path, e))?;
        rows.into_iter()
            .map(|(hash, size)| self.decode(hash, size))
            .collect()
    }

    fn for_each(&self, visit: &mut dyn FnMut(Signature) -> Result<()>) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT hash, size FROM signatures")
            .map_err(|e| classify(&self.path, e))?;
        let mut rows = stmt.query([]).map_err(|e| classify(&self.path, e))?;
        while let Some(row) = rows.next().map_err(|e| classify(&self.path, e))? {
            let hash: Vec<u8> = row.get(0)?;
            let size: i64 = row.get(1)?;
            visit(self.decode(hash, size)?)?;
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM signatures", [], |row| row.get(0))
            .map_err(|e| classify(&self.path, e))?;
        Ok(count as usize)
    }
}
