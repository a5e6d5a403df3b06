//! Fingerprinting: streaming SHA-1 and parallel batches.

pub mod batch;
pub mod hash;
