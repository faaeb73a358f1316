//! Watched-input expansion: directories walk recursively, files pass through.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::FingerprintError;

/// Expand a watched input set into a flat, sorted list of file paths.
///
/// Each input is either a directory (walked recursively, symlinks not
/// followed) or an explicit file path. A missing or unreadable input is a
/// hard error: the caller asked to watch it, so silently skipping it would
/// make the change gate blind to it.
///
/// Duplicate inputs only cause redundant hashing downstream, so no
/// deduplication is performed here. The output is sorted for deterministic
/// logging; the snapshot map itself is order-independent.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, FingerprintError> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            walk_dir(input, &mut files)?;
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(FingerprintError::Walk {
                path: input.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "watched input is not a file or directory",
                ),
            });
        }
    }

    files.sort();
    Ok(files)
}

fn walk_dir(root: &Path, files: &mut Vec<PathBuf>) -> Result<(), FingerprintError> {
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            FingerprintError::Walk {
                path,
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            }
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(())
}
