//! Fingerprint snapshots and their on-disk persistence.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{hasher, FingerprintError};

/// Snapshot schema version. Bumping it invalidates existing cache files,
/// which only costs one extra rebuild.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A complete mapping of watched file path to content fingerprint at one
/// point in time.
///
/// Paths are stored as strings because the snapshot is private cache state:
/// it is regenerated from source whenever it is missing or stale, so no
/// cross-platform or cross-version stability is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version of this snapshot.
    pub version: u32,
    /// Watched file path → BLAKE3 hex digest of its contents.
    pub hashes: BTreeMap<String, String>,
}

/// Envelope for snapshot files to include integrity checks.
///
/// Same shape as a checksummed session file: the payload is serialized
/// compactly, hashed with SHA-256, and stored next to its checksum. A
/// mismatch on load means the file was truncated or hand-edited.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    /// SHA-256 checksum of the compactly serialized snapshot.
    checksum: String,
    /// The actual snapshot data.
    snapshot: Snapshot,
}

impl Snapshot {
    /// Build a snapshot by hashing every file in `files`.
    ///
    /// Fails with [`FingerprintError::UnreadableInput`] if any file cannot
    /// be opened or read; a file vanishing between enumeration and hashing
    /// is a real race and must abort the run rather than be skipped.
    pub fn scan(files: &[PathBuf]) -> Result<Self, FingerprintError> {
        let mut hashes = BTreeMap::new();
        for path in files {
            let digest = hasher::hash_file(path)?;
            hashes.insert(path.to_string_lossy().into_owned(), digest);
        }
        Ok(Self {
            version: SNAPSHOT_VERSION,
            hashes,
        })
    }

    /// Load a persisted snapshot from `path`.
    ///
    /// A missing, unparseable, checksum-mismatched, or version-mismatched
    /// file all degrade to the empty snapshot: the worst case is one extra
    /// rebuild, so the cache is self-healing rather than fatal.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No snapshot at {}, treating as empty", path.display());
            return Self::empty();
        }
        match Self::load_checked(path) {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                log::warn!(
                    "Ignoring unusable snapshot {}: {reason}",
                    path.display()
                );
                Self::empty()
            }
        }
    }

    fn load_checked(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
        let envelope: SnapshotEnvelope =
            serde_json::from_str(&content).map_err(|e| format!("parse failed: {e}"))?;

        // Re-serialize the payload to verify the checksum. MUST use the
        // same compact serialization as save().
        let payload = serde_json::to_string(&envelope.snapshot)
            .map_err(|e| format!("re-serialize failed: {e}"))?;
        if checksum_of(&payload) != envelope.checksum {
            return Err("checksum mismatch".to_string());
        }

        if envelope.snapshot.version != SNAPSHOT_VERSION {
            return Err(format!(
                "unsupported snapshot version {}",
                envelope.snapshot.version
            ));
        }

        Ok(envelope.snapshot)
    }

    /// Persist this snapshot to `path`, overwriting any previous file.
    /// The parent directory is created if needed.
    pub fn save(&self, path: &Path) -> Result<(), FingerprintError> {
        let io_err = |source| FingerprintError::CacheWrite {
            path: path.to_path_buf(),
            source,
        };

        let payload = serde_json::to_string(self).map_err(|e| {
            io_err(std::io::Error::other(e))
        })?;
        let envelope = SnapshotEnvelope {
            checksum: checksum_of(&payload),
            snapshot: self.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope).map_err(|e| {
            io_err(std::io::Error::other(e))
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        Ok(())
    }

    /// The empty snapshot (no watched files).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            hashes: BTreeMap::new(),
        }
    }

    /// Whether this snapshot differs from `other`.
    ///
    /// True if the key sets differ (added or deleted files) or any shared
    /// key maps to a different hash. Map equality covers all three cases.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.hashes != other.hashes
    }
}

fn checksum_of(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}
