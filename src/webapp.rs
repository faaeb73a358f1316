//! The webapp build action: package-manager install followed by build.
//!
//! The build tool is resolved from an ordered candidate list (`yarn`, then
//! `npm` by default) via a PATH lookup; if no candidate is available the
//! action fails with [`BuildError::ToolNotFound`] rather than silently
//! falling through. The subprocesses run with an explicit working directory
//! instead of mutating the process-wide current directory.

use std::path::PathBuf;
use std::process::Command;

/// Errors from the webapp build action.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    /// None of the configured build-tool candidates is on PATH.
    #[error("No build tool found on PATH (tried: {})", candidates.join(", "))]
    ToolNotFound {
        /// Candidate executable names, in the order they were tried
        candidates: Vec<String>,
    },

    /// The build tool could not be spawned.
    #[error("Failed to run `{tool} {step}`: {source}")]
    Spawn {
        /// Resolved tool name
        tool: String,
        /// Step that failed to start ("install" or "build")
        step: &'static str,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A build step exited non-zero.
    #[error("`{tool} {step}` failed with exit code {code:?}")]
    StepFailed {
        /// Resolved tool name
        tool: String,
        /// Step that failed ("install" or "build")
        step: &'static str,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
    },
}

/// Runs the webapp build (`<tool> install`, then `<tool> run build`) inside
/// the webapp directory.
#[derive(Debug, Clone)]
pub struct WebappBuilder {
    /// Directory the build runs in
    dir: PathBuf,
    /// Ordered build-tool candidates
    tools: Vec<String>,
}

impl WebappBuilder {
    /// Create a builder for `dir` with the given tool candidates.
    #[must_use]
    pub fn new(dir: PathBuf, tools: Vec<String>) -> Self {
        Self { dir, tools }
    }

    /// Resolve the first candidate tool available on PATH.
    pub fn resolve_tool(&self) -> Result<String, BuildError> {
        for candidate in &self.tools {
            if which::which(candidate).is_ok() {
                log::debug!("Using build tool: {candidate}");
                return Ok(candidate.clone());
            }
        }
        Err(BuildError::ToolNotFound {
            candidates: self.tools.clone(),
        })
    }

    /// Run the full build: install dependencies, then build.
    ///
    /// Any non-zero exit of either step is fatal; the caller (the build
    /// gate) must not persist its snapshot in that case.
    pub fn build(&self) -> Result<(), BuildError> {
        let tool = self.resolve_tool()?;
        log::info!("Webapp changed, rebuilding in {}", self.dir.display());

        self.run_step(&tool, "install", &["install"])?;
        self.run_step(&tool, "build", &["run", "build"])?;

        log::info!("Webapp build completed successfully");
        Ok(())
    }

    fn run_step(&self, tool: &str, step: &'static str, args: &[&str]) -> Result<(), BuildError> {
        log::debug!("Running `{tool} {}` in {}", args.join(" "), self.dir.display());
        let status = Command::new(tool)
            .args(args)
            .current_dir(&self.dir)
            .status()
            .map_err(|source| BuildError::Spawn {
                tool: tool.to_string(),
                step,
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BuildError::StepFailed {
                tool: tool.to_string(),
                step,
                code: status.code(),
            })
        }
    }
}
