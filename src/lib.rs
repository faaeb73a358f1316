//! firmgate - Firmware Build-Pipeline Helpers
//!
//! Two small helpers used around a firmware build: a change-gated webapp
//! rebuild (content-hash snapshot of the webapp sources gates a
//! package-manager install + build) and gzip compression of compiled
//! firmware images for upload.

pub mod cli;
pub mod compress;
pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod logging;
pub mod webapp;

use anyhow::{Context, Result};

use cli::{Cli, Commands, WebappArgs};
use error::ExitCode;
use gate::Outcome;
use webapp::WebappBuilder;

/// Run the application logic for a parsed CLI invocation.
///
/// Returns the exit code on success; errors propagate to `main` which maps
/// them to exit codes and reports them.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    match cli.command {
        Commands::Webapp(args) => run_webapp(&args),
        Commands::Compress(args) => {
            compress::compress_images(&args.images)
                .context("Firmware compression failed")?;
            Ok(ExitCode::Success)
        }
    }
}

fn run_webapp(args: &WebappArgs) -> Result<ExitCode> {
    // CI runners build the webapp in their own pipeline stage; skip the
    // whole evaluation there unless explicitly forced.
    if !args.force && std::env::var_os("CI").is_some() {
        log::info!("CI environment detected, skipping webapp rebuild check");
        return Ok(ExitCode::Success);
    }

    let mut watched = vec![args.dir.clone()];
    watched.extend(args.watch.iter().cloned());
    let cache_file = args.cache_file();

    let builder = WebappBuilder::new(args.dir.clone(), args.tools.clone());
    let action = || builder.build().map_err(anyhow::Error::from);

    let outcome = if args.force {
        gate::rebuild(&watched, &cache_file, action)
    } else {
        gate::evaluate(&watched, &cache_file, action)
    }
    .context("Webapp rebuild check failed")?;

    match outcome {
        Outcome::UpToDate => log::info!("Webapp is up to date"),
        Outcome::Rebuilt => log::info!("Webapp rebuilt, snapshot updated"),
    }
    Ok(ExitCode::Success)
}
