//! Rule agent CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Gate failure

use std::process::ExitCode;

use clap::Parser;
use rule_agent::RuleError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const GATE_FAILURE: u8 = 3;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rule_agent={level},rule_agent_cli={level},warn")));
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args).await,
        Commands::Presets(args) => commands::presets::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Map an error to its exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<RuleError>() {
        Some(RuleError::GateFailed { .. }) => ExitCodes::GATE_FAILURE,
        Some(
            RuleError::InvalidConfiguration(_)
            | RuleError::UnknownPreset(_)
            | RuleError::InvalidPattern { .. }
            | RuleError::Fixture { .. },
        ) => ExitCodes::INVALID_ARGS,
        Some(_) => ExitCodes::GENERAL_ERROR,
        None if e.to_string().contains("not found") => ExitCodes::INVALID_ARGS,
        None => ExitCodes::GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_agent::GateStatus;

    #[test]
    fn test_categorize_error() {
        let gate = anyhow::Error::new(RuleError::GateFailed {
            status: GateStatus::Fail,
            score: 40,
            fatal_issues: vec!["[style-compliance] Inline style".into()],
        });
        assert_eq!(categorize_error(&gate), ExitCodes::GATE_FAILURE);

        let preset = anyhow::Error::new(RuleError::UnknownPreset("nightly".into())).context("Loading configuration");
        assert_eq!(categorize_error(&preset), ExitCodes::INVALID_ARGS);

        assert_eq!(categorize_error(&anyhow::anyhow!("Path not found: x")), ExitCodes::INVALID_ARGS);
        assert_eq!(categorize_error(&anyhow::anyhow!("boom")), ExitCodes::GENERAL_ERROR);
    }
}
