//! Command-line interface definitions for firmgate.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, color) and
//! subcommands for the two pipeline stages.
//!
//! # Example
//!
//! ```bash
//! # Rebuild the webapp only if its sources changed
//! firmgate webapp webapp
//!
//! # Watch extra files alongside the webapp directory
//! firmgate webapp webapp --watch platformio.ini
//!
//! # Compress firmware images after build
//! firmgate compress .pio/build/generic/firmware.bin .pio/build/generic/firmware.factory.bin
//!
//! # Verbose mode for debugging
//! firmgate -v webapp webapp
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Firmware build-pipeline helpers.
///
/// firmgate gates a webapp rebuild behind a content-hash snapshot of its
/// sources and compresses compiled firmware images for upload.
#[derive(Debug, Parser)]
#[command(name = "firmgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Emit errors as JSON on stderr (for CI log scrapers)
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for firmgate.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rebuild the webapp if any watched source file changed
    Webapp(WebappArgs),
    /// Gzip-compress firmware images for upload
    Compress(CompressArgs),
}

/// Arguments for the webapp subcommand.
#[derive(Debug, Args)]
pub struct WebappArgs {
    /// Webapp source directory (watched recursively, and the build runs here)
    #[arg(value_name = "DIR", default_value = "webapp")]
    pub dir: PathBuf,

    /// Additional files or directories to watch for changes
    ///
    /// Can be specified multiple times. Directories are watched recursively.
    #[arg(long = "watch", value_name = "PATH")]
    pub watch: Vec<PathBuf>,

    /// Path to the fingerprint snapshot file
    ///
    /// If not specified, `.webapp_hashes.json` next to DIR is used.
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Build-tool candidates, tried in order until one is found on PATH
    #[arg(long = "tool", value_name = "NAME", default_values = ["yarn", "npm"])]
    pub tools: Vec<String>,

    /// Rebuild even if no change is detected, and ignore the CI bypass
    #[arg(long)]
    pub force: bool,
}

impl WebappArgs {
    /// Resolve the snapshot file path: explicit `--cache`, or
    /// `.webapp_hashes.json` as a sibling of the webapp directory.
    #[must_use]
    pub fn cache_file(&self) -> PathBuf {
        self.cache.clone().unwrap_or_else(|| {
            self.dir
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".webapp_hashes.json")
        })
    }
}

/// Arguments for the compress subcommand.
#[derive(Debug, Args)]
pub struct CompressArgs {
    /// Firmware images to compress (each produces `<file>.gz`)
    #[arg(value_name = "BIN", required = true)]
    pub images: Vec<PathBuf>,
}
