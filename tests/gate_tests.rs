//! End-to-end tests for the change-gated build cache.

use firmgate::gate::{self, GateError, Outcome};
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// A temp tree with one watched directory and a cache path beside it.
struct Fixture {
    _root: TempDir,
    watched: PathBuf,
    cache: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempdir().unwrap();
        let watched = root.path().join("webapp");
        fs::create_dir(&watched).unwrap();
        let cache = root.path().join(".webapp_hashes.json");
        Self {
            _root: root,
            watched,
            cache,
        }
    }

    fn write(&self, name: &str, content: &[u8]) {
        fs::write(self.watched.join(name), content).unwrap();
    }

    fn evaluate_counting(&self, calls: &Cell<u32>) -> Result<Outcome, GateError> {
        gate::evaluate(&[self.watched.clone()], &self.cache, || {
            calls.set(calls.get() + 1);
            Ok(())
        })
    }
}

#[test]
fn first_run_with_empty_cache_builds() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    let calls = Cell::new(0);

    let outcome = fx.evaluate_counting(&calls).unwrap();

    assert_eq!(outcome, Outcome::Rebuilt);
    assert_eq!(calls.get(), 1);
    assert!(fx.cache.exists());
}

#[test]
fn second_run_over_unchanged_inputs_does_not_build() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    let calls = Cell::new(0);

    fx.evaluate_counting(&calls).unwrap();
    let outcome = fx.evaluate_counting(&calls).unwrap();

    assert_eq!(outcome, Outcome::UpToDate);
    assert_eq!(calls.get(), 1);
}

#[test]
fn single_byte_modification_triggers_rebuild() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    let calls = Cell::new(0);

    fx.evaluate_counting(&calls).unwrap();
    fx.write("a.txt", b"hellp");

    let outcome = fx.evaluate_counting(&calls).unwrap();
    assert_eq!(outcome, Outcome::Rebuilt);
    assert_eq!(calls.get(), 2);
}

#[test]
fn added_file_is_detected_as_change() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    let calls = Cell::new(0);

    fx.evaluate_counting(&calls).unwrap();
    fx.write("b.txt", b"new file");

    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::Rebuilt);
    assert_eq!(calls.get(), 2);
}

#[test]
fn deleted_file_is_detected_as_change() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    fx.write("b.txt", b"doomed");
    let calls = Cell::new(0);

    fx.evaluate_counting(&calls).unwrap();
    fs::remove_file(fx.watched.join("b.txt")).unwrap();

    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::Rebuilt);
    assert_eq!(calls.get(), 2);
}

#[test]
fn failed_build_leaves_cache_byte_identical() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    let calls = Cell::new(0);

    // Establish a persisted snapshot, then invalidate it.
    fx.evaluate_counting(&calls).unwrap();
    let before = fs::read(&fx.cache).unwrap();
    fx.write("a.txt", b"world");

    let err = gate::evaluate(&[fx.watched.clone()], &fx.cache, || {
        anyhow::bail!("yarn build exited with code 1")
    })
    .unwrap_err();

    assert!(matches!(err, GateError::Build(_)));
    assert_eq!(fs::read(&fx.cache).unwrap(), before);

    // Retry contract: the next run still sees the change and builds.
    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::Rebuilt);
    assert_eq!(calls.get(), 2);
}

#[test]
fn corrupted_cache_is_treated_as_empty() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    fs::write(&fx.cache, b"\x00\x01 definitely not json").unwrap();
    let calls = Cell::new(0);

    // No crash, and the corrupt state forces one rebuild.
    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::Rebuilt);
    assert_eq!(calls.get(), 1);

    // The cache healed: a second run is up to date.
    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::UpToDate);
    assert_eq!(calls.get(), 1);
}

#[test]
fn hello_world_scenario() {
    // Watched set = {a.txt("hello")}, empty cache:
    // evaluate -> build once; re-run -> no build; change to "world" -> build.
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    let calls = Cell::new(0);

    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::Rebuilt);
    assert_eq!(calls.get(), 1);

    let cache_json = fs::read_to_string(&fx.cache).unwrap();
    let hello_hash = blake3_hex(b"hello");
    assert!(cache_json.contains(&hello_hash));

    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::UpToDate);
    assert_eq!(calls.get(), 1);

    fx.write("a.txt", b"world");
    assert_eq!(fx.evaluate_counting(&calls).unwrap(), Outcome::Rebuilt);
    assert_eq!(calls.get(), 2);

    let cache_json = fs::read_to_string(&fx.cache).unwrap();
    assert!(cache_json.contains(&blake3_hex(b"world")));
    assert!(!cache_json.contains(&hello_hash));
}

#[test]
fn explicit_file_inputs_are_watched_alongside_directories() {
    let fx = Fixture::new();
    fx.write("a.txt", b"hello");
    let extra = fx._root.path().join("platformio.ini");
    fs::write(&extra, b"[env]").unwrap();
    let calls = Cell::new(0);

    let inputs = vec![fx.watched.clone(), extra.clone()];
    gate::evaluate(&inputs, &fx.cache, || {
        calls.set(calls.get() + 1);
        Ok(())
    })
    .unwrap();

    // Changing only the explicit file triggers a rebuild.
    fs::write(&extra, b"[env]\nboard = esp32").unwrap();
    let outcome = gate::evaluate(&inputs, &fx.cache, || {
        calls.set(calls.get() + 1);
        Ok(())
    })
    .unwrap();

    assert_eq!(outcome, Outcome::Rebuilt);
    assert_eq!(calls.get(), 2);
}

fn blake3_hex(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}
