//! Hashing utilities

use std::path::Path;

use sha2::{Digest, Sha256};

/// Fingerprint the combined contents of several files
///
/// Each file's length is mixed in before its bytes so that moving content
/// between files changes the digest.
pub fn hash_files(paths: &[&Path]) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    for path in paths {
        let bytes = std::fs::read(path)?;
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(hex::encode(hasher.finalize()))
}
