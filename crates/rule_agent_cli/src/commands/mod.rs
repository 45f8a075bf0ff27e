//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod check;
pub mod presets;

/// rule-agent - governance checks for proposed code changes
#[derive(Parser)]
#[command(name = "rule-agent")]
#[command(version, about = "Governance rule engine for proposed code changes")]
#[command(long_about = r#"
Evaluates a project directory against style, structural/security and
integration policies, scores the findings and decides a gate verdict.

COMMANDS:
  check    → Evaluate a module and print the report
  presets  → Print the built-in configuration presets

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Gate failure (with --assert)
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a module against the configured checks
    Check(check::CheckArgs),

    /// Print preset configurations as YAML
    Presets(presets::PresetsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_command() {
        let cli = Cli::try_parse_from([
            "rule-agent",
            "check",
            "--module",
            "orders",
            "--feature",
            "docs",
            "--feature",
            "checkout",
            "--exclude",
            "lib/generated/**",
            "--preset",
            "strict",
            "--assert",
        ])
        .unwrap();

        let Commands::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.module, "orders");
        assert_eq!(args.features, vec!["docs", "checkout"]);
        assert_eq!(args.excludes, vec!["lib/generated/**"]);
        assert_eq!(args.preset, "strict");
        assert_eq!(args.format, "text");
        assert!(args.assert);
        assert_eq!(args.timeout_secs, 30);
    }

    #[test]
    fn test_check_requires_module() {
        assert!(Cli::try_parse_from(["rule-agent", "check"]).is_err());
    }

    #[test]
    fn test_parse_presets_command() {
        let cli = Cli::try_parse_from(["rule-agent", "-q", "presets", "ci"]).unwrap();
        assert!(cli.quiet);
        let Commands::Presets(args) = cli.command else {
            panic!("expected presets command");
        };
        assert_eq!(args.name.as_deref(), Some("ci"));
    }
}
