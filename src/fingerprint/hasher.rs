//! BLAKE3 file hasher with streaming support.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::FingerprintError;

/// Read buffer size for streaming hashing (64 KiB).
const READ_BUF_SIZE: usize = 64 * 1024;

/// Compute the BLAKE3 content hash of a file, returned as a hex digest.
///
/// The file is read in chunks so arbitrarily large inputs hash in constant
/// memory. Any failure to open or read the file is an
/// [`FingerprintError::UnreadableInput`] carrying the offending path.
pub fn hash_file(path: &Path) -> Result<String, FingerprintError> {
    let file = File::open(path).map_err(|source| FingerprintError::UnreadableInput {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|source| FingerprintError::UnreadableInput {
                path: path.to_path_buf(),
                source,
            })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
