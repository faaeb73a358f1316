//! firmgate - Firmware Build-Pipeline Helpers
//!
//! Entry point for the firmgate CLI application.

use clap::Parser;
use firmgate::{
    cli::Cli,
    error::{ExitCode, StructuredError},
    gate::GateError,
    webapp::BuildError,
};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    // Run the application logic
    match firmgate::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = classify_error(&err);

            // Report the error
            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}

/// Map a propagated error to the appropriate exit code.
fn classify_error(err: &anyhow::Error) -> ExitCode {
    if let Some(GateError::Build(inner)) = err.downcast_ref::<GateError>() {
        return match inner.downcast_ref::<BuildError>() {
            Some(BuildError::ToolNotFound { .. }) => ExitCode::ToolNotFound,
            _ => ExitCode::BuildFailed,
        };
    }
    ExitCode::GeneralError
}
