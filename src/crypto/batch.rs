//! Parallel batch fingerprinting via rayon.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::crypto::hash::fingerprint_file;
use crate::errors::Result;
use crate::signature::Signature;

/// Fingerprint many files in parallel.
/// Results come back in input order, one per path.
pub fn fingerprint_all(paths: Vec<PathBuf>, chunk_size: usize) -> Vec<(PathBuf, Result<Signature>)> {
    paths
        .into_par_iter()
        .map(|path| {
            let sig = fingerprint_file(&path, chunk_size);
            (path, sig)
        })
        .collect()
}
