//! Runtime configuration: where the registry lives and how files are read.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::errors::{BanishError, Result};

/// Default read block size for fingerprinting.
pub const DEFAULT_CHUNK_SIZE: usize = 1_024_000;

/// Largest accepted read block size (64 MiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "banish.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the registry database.
    pub data_directory: PathBuf,
    /// Bytes read per block while hashing.
    pub chunk_size: usize,
}

impl Config {
    pub fn new(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// The per-user location, `<home>/.local/banish`.
    pub fn from_home() -> Result<Self> {
        let dirs = BaseDirs::new().ok_or(BanishError::NoHomeDirectory)?;
        Ok(Self::new(Self::default_data_directory(dirs.home_dir())))
    }

    pub fn default_data_directory(home: &Path) -> PathBuf {
        home.join(".local").join("banish")
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_directory.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let cfg = Config::new(Config::default_data_directory(Path::new("/home/ada")));
        assert_eq!(cfg.data_directory, PathBuf::from("/home/ada/.local/banish"));
        assert_eq!(
            cfg.database_path(),
            PathBuf::from("/home/ada/.local/banish/banish.db")
        );
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        let cfg = Config::new("/tmp/x").with_chunk_size(0);
        assert_eq!(cfg.chunk_size, 1);
    }

    #[test]
    fn test_oversized_chunk_size_capped() {
        let cfg = Config::new("/tmp/x").with_chunk_size(usize::MAX);
        assert_eq!(cfg.chunk_size, MAX_CHUNK_SIZE);
    }
}
