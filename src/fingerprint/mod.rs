//! File fingerprinting: input expansion, content hashing, and snapshots.
//!
//! The fingerprint of a file is a BLAKE3 hex digest of its bytes, a
//! deterministic function of content only. A [`Snapshot`] maps every file
//! in the watched input set to its fingerprint; comparing two snapshots is
//! how the build gate decides whether anything changed.
//!
//! Submodules:
//! - [`walker`]: expands watched inputs (directories and files) to a flat file list
//! - [`hasher`]: streaming BLAKE3 content hashing
//! - [`snapshot`]: the snapshot type and its checksummed on-disk form

pub mod hasher;
pub mod snapshot;
pub mod walker;

use std::path::PathBuf;

pub use hasher::hash_file;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use walker::expand_inputs;

/// Errors that can occur while fingerprinting watched inputs.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// A watched file could not be opened or read for hashing.
    #[error("Cannot read watched file {path}: {source}")]
    UnreadableInput {
        /// Path that failed to hash
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A watched input could not be enumerated.
    #[error("Cannot walk watched input {path}: {source}")]
    Walk {
        /// Path where enumeration failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The new snapshot could not be persisted to the cache file.
    #[error("Cannot write snapshot {path}: {source}")]
    CacheWrite {
        /// Cache file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
