//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the firmgate application.
///
/// - 0: Success (build ran, or inputs were up to date)
/// - 1: General error (unexpected failure)
/// - 2: Build failure (external build action exited non-zero)
/// - 3: Tool not found (all build-tool candidates exhausted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed, with or without a rebuild.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Build failure: the external build action exited non-zero.
    BuildFailed = 2,
    /// Tool not found: no build-tool candidate was available on PATH.
    ToolNotFound = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FG000",
            Self::GeneralError => "FG001",
            Self::BuildFailed => "FG002",
            Self::ToolNotFound => "FG003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FG001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::BuildFailed.as_i32(), 2);
        assert_eq!(ExitCode::ToolNotFound.as_i32(), 3);
    }

    #[test]
    fn test_code_prefixes() {
        assert_eq!(ExitCode::Success.code_prefix(), "FG000");
        assert_eq!(ExitCode::BuildFailed.code_prefix(), "FG002");
    }

    #[test]
    fn test_structured_error_message_includes_cause() {
        let err = anyhow::anyhow!("root cause").context("outer context");
        let structured = StructuredError::new(&err, ExitCode::GeneralError);
        assert_eq!(structured.code, "FG001");
        assert_eq!(structured.exit_code, 1);
        assert!(structured.message.contains("outer context"));
        assert!(structured.message.contains("root cause"));
    }
}
