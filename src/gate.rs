//! Change-gated build cache.
//!
//! Decides, from file contents alone, whether a downstream build action must
//! run. The watched inputs are fingerprinted into a [`Snapshot`], compared
//! against the snapshot persisted by the previous run, and the build action
//! is invoked only when something differs. The new snapshot is persisted
//! only after the action succeeds, so a failed build is retried on the next
//! invocation.

use std::path::{Path, PathBuf};

use crate::fingerprint::{expand_inputs, FingerprintError, Snapshot};

/// What [`evaluate`] decided and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No watched input changed; the build action was not invoked.
    UpToDate,
    /// A change was detected; the build action ran and the snapshot was
    /// persisted.
    Rebuilt,
}

/// Errors from a gate evaluation.
#[derive(thiserror::Error, Debug)]
pub enum GateError {
    /// Walking or hashing the watched inputs failed, or the new snapshot
    /// could not be written after a successful build.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    /// The build action reported failure. The snapshot file is left
    /// untouched so the next run retries.
    #[error("Build action failed")]
    Build(#[source] anyhow::Error),
}

/// Run the build action if and only if the watched inputs changed since the
/// last persisted snapshot.
///
/// Guarantees:
/// - the build action is invoked at most once per call;
/// - after a successful call the cache file reflects exactly the inputs
///   that were built;
/// - after a failed call the cache file is byte-identical to before, so
///   the failure is retried on the next invocation rather than forgotten.
///
/// A missing or corrupt cache file is treated as an empty snapshot, which
/// makes the first run (and recovery from corruption) always build.
pub fn evaluate<F>(
    watched_inputs: &[PathBuf],
    cache_file: &Path,
    build_action: F,
) -> Result<Outcome, GateError>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    let files = expand_inputs(watched_inputs)?;
    let current = Snapshot::scan(&files)?;
    let previous = Snapshot::load(cache_file);

    if !current.differs_from(&previous) {
        log::info!(
            "{} watched files unchanged, build is up to date",
            files.len()
        );
        return Ok(Outcome::UpToDate);
    }

    log_changes(&previous, &current);
    build_action().map_err(GateError::Build)?;
    current.save(cache_file)?;
    Ok(Outcome::Rebuilt)
}

/// Run the build action unconditionally and persist the snapshot on success.
///
/// Used by `--force`: the comparison is skipped but the persistence contract
/// is the same as [`evaluate`], so a later non-forced run sees fresh state.
pub fn rebuild<F>(
    watched_inputs: &[PathBuf],
    cache_file: &Path,
    build_action: F,
) -> Result<Outcome, GateError>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    let files = expand_inputs(watched_inputs)?;
    let current = Snapshot::scan(&files)?;

    build_action().map_err(GateError::Build)?;
    current.save(cache_file)?;
    Ok(Outcome::Rebuilt)
}

/// Debug-log which paths triggered the rebuild.
fn log_changes(previous: &Snapshot, current: &Snapshot) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    for (path, hash) in &current.hashes {
        match previous.hashes.get(path) {
            None => log::debug!("New file: {path}"),
            Some(old) if old != hash => log::debug!("Modified: {path}"),
            Some(_) => {}
        }
    }
    for path in previous.hashes.keys() {
        if !current.hashes.contains_key(path) {
            log::debug!("Deleted: {path}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    fn counting_action(counter: &Cell<u32>) -> impl FnOnce() -> anyhow::Result<()> + '_ {
        move || {
            counter.set(counter.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_first_run_builds_and_persists() {
        let dir = tempdir().unwrap();
        let watched = dir.path().join("web");
        std::fs::create_dir(&watched).unwrap();
        std::fs::write(watched.join("a.txt"), b"hello").unwrap();
        let cache = dir.path().join("snap.json");
        let calls = Cell::new(0);

        let outcome =
            evaluate(&[watched.clone()], &cache, counting_action(&calls)).unwrap();
        assert_eq!(outcome, Outcome::Rebuilt);
        assert_eq!(calls.get(), 1);
        assert!(cache.exists());
    }

    #[test]
    fn test_unchanged_inputs_skip_build_and_cache_write() {
        let dir = tempdir().unwrap();
        let watched = dir.path().join("web");
        std::fs::create_dir(&watched).unwrap();
        std::fs::write(watched.join("a.txt"), b"hello").unwrap();
        let cache = dir.path().join("snap.json");
        let calls = Cell::new(0);

        evaluate(&[watched.clone()], &cache, counting_action(&calls)).unwrap();
        let cache_bytes = std::fs::read(&cache).unwrap();

        let outcome =
            evaluate(&[watched.clone()], &cache, counting_action(&calls)).unwrap();
        assert_eq!(outcome, Outcome::UpToDate);
        assert_eq!(calls.get(), 1);
        assert_eq!(std::fs::read(&cache).unwrap(), cache_bytes);
    }

    #[test]
    fn test_failed_build_leaves_cache_untouched() {
        let dir = tempdir().unwrap();
        let watched = dir.path().join("web");
        std::fs::create_dir(&watched).unwrap();
        std::fs::write(watched.join("a.txt"), b"hello").unwrap();
        let cache = dir.path().join("snap.json");

        let err = evaluate(&[watched.clone()], &cache, || {
            anyhow::bail!("install step exited with code 1")
        })
        .unwrap_err();
        assert!(matches!(err, GateError::Build(_)));
        assert!(!cache.exists());
    }

    #[test]
    fn test_rebuild_skips_comparison() {
        let dir = tempdir().unwrap();
        let watched = dir.path().join("web");
        std::fs::create_dir(&watched).unwrap();
        std::fs::write(watched.join("a.txt"), b"hello").unwrap();
        let cache = dir.path().join("snap.json");
        let calls = Cell::new(0);

        evaluate(&[watched.clone()], &cache, counting_action(&calls)).unwrap();
        // A non-forced run would be up to date here; rebuild still builds.
        let outcome =
            rebuild(&[watched.clone()], &cache, counting_action(&calls)).unwrap();
        assert_eq!(outcome, Outcome::Rebuilt);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_missing_watched_input_is_fatal() {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("snap.json");
        let calls = Cell::new(0);

        let err = evaluate(
            &[dir.path().join("missing")],
            &cache,
            counting_action(&calls),
        )
        .unwrap_err();
        assert!(matches!(err, GateError::Fingerprint(_)));
        assert_eq!(calls.get(), 0);
        assert!(!cache.exists());
    }
}
