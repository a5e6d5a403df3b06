//! SHA-1 file fingerprinting.
//!
//! Files are streamed through the hasher in fixed-size blocks so the whole
//! file never sits in memory. The recorded size is the stream position
//! reached at end of input.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use sha1::{Digest as _, Sha1};

use crate::errors::{BanishError, Result};
use crate::signature::{Digest, Signature, DIGEST_LEN};

/// Compute SHA-1 of an in-memory buffer.
pub fn sha1_digest(data: &[u8]) -> Digest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    finish(hasher)
}

/// Fingerprint a seekable stream from its start.
pub fn fingerprint<R: Read + Seek>(reader: &mut R, chunk_size: usize) -> Result<Signature> {
    reader.seek(SeekFrom::Start(0))?;

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buf[..n]);
    }

    let size = reader.stream_position()?;
    Ok(Signature::new(finish(hasher), size))
}

/// Open and fingerprint a regular file.
///
/// Every failure to open or read the file, including `path` naming a
/// directory, surfaces as [`BanishError::FileAccess`].
pub fn fingerprint_file(path: impl AsRef<Path>, chunk_size: usize) -> Result<Signature> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| BanishError::file_access(path, e))?;
    let meta = file
        .metadata()
        .map_err(|e| BanishError::file_access(path, e))?;
    if meta.is_dir() {
        return Err(BanishError::file_access(
            path,
            io::Error::other("is a directory"),
        ));
    }

    fingerprint(&mut file, chunk_size).map_err(|e| match e {
        BanishError::Io(source) => BanishError::file_access(path, source),
        other => other,
    })
}

fn finish(hasher: Sha1) -> Digest {
    let result = hasher.finalize();
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&result);
    Digest(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    #[test]
    fn test_sha1_known_vectors() {
        assert_eq!(sha1_digest(b"").to_hex(), EMPTY_SHA1);
        assert_eq!(
            sha1_digest(b"abc").to_hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_empty_stream() {
        let sig = fingerprint(&mut Cursor::new(Vec::new()), 1024).unwrap();
        assert_eq!(sig.digest.to_hex(), EMPTY_SHA1);
        assert_eq!(sig.size, 0);
    }

    #[test]
    fn test_rewinds_before_hashing() {
        let data = b"the quick brown fox".to_vec();
        let mut cursor = Cursor::new(data.clone());
        cursor.set_position(7);
        let sig = fingerprint(&mut cursor, 4).unwrap();
        assert_eq!(sig.digest, sha1_digest(&data));
        assert_eq!(sig.size, data.len() as u64);
    }

    #[test]
    fn test_chunk_boundaries() {
        let chunk = 64;
        for len in [chunk - 1, chunk, chunk + 1, chunk * 3, chunk * 3 + 1] {
            let data: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
            let sig = fingerprint(&mut Cursor::new(data.clone()), chunk).unwrap();
            assert_eq!(sig.digest, sha1_digest(&data), "len {len}");
            assert_eq!(sig.size, len as u64);
        }
    }

    #[test]
    fn test_file_at_default_chunk_boundaries() {
        let chunk = crate::config::DEFAULT_CHUNK_SIZE;
        let dir = tempfile::tempdir().unwrap();
        for len in [chunk - 1, chunk, chunk + 1, chunk * 2] {
            let data: Vec<u8> = (0..len).map(|i| (i % 253) as u8).collect();
            let path = dir.path().join(format!("f{len}"));
            std::fs::File::create(&path).unwrap().write_all(&data).unwrap();

            let sig = fingerprint_file(&path, chunk).unwrap();
            assert_eq!(sig.digest, sha1_digest(&data), "len {len}");
            assert_eq!(sig.size, len as u64);
        }
    }

    #[test]
    fn test_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("same.txt");
        std::fs::write(&path, b"banish me").unwrap();
        let a = fingerprint_file(&path, 3).unwrap();
        let b = fingerprint_file(&path, 1024).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_file_is_file_access() {
        let dir = tempfile::tempdir().unwrap();
        let err = fingerprint_file(dir.path().join("absent"), 1024).unwrap_err();
        assert!(err.is_file_access());
    }

    #[test]
    fn test_directory_is_file_access() {
        let dir = tempfile::tempdir().unwrap();
        let err = fingerprint_file(dir.path(), 1024).unwrap_err();
        assert!(err.is_file_access());
    }
}
