//! Check command - Evaluate a module and report the verdict.
//!
//! Loads the project tree into a policy context, runs the rule agent and
//! prints the report. With `--assert` a failing verdict becomes exit code 3.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use rule_agent::config::FixturePaths;
use rule_agent::{ContextLoader, GateStatus, RuleAgent, RuleAgentConfig, RuleError};

#[derive(Args)]
pub struct CheckArgs {
    /// Project root to evaluate
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Module identifier of the change
    #[arg(short, long)]
    pub module: String,

    /// YAML route manifest
    #[arg(long)]
    pub routes: Option<PathBuf>,

    /// Declared feature tag (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<String>,

    /// Configuration preset (strict, development, ci)
    #[arg(long, default_value = "ci", env = "RULE_AGENT_PRESET")]
    pub preset: String,

    /// Configuration file; takes precedence over --preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding fixture documents
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Glob of paths to skip, relative to --path (repeatable)
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Exit with code 3 when the gate fails
    #[arg(long)]
    pub assert: bool,

    /// Abort the evaluation after this many seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

pub async fn execute(args: CheckArgs) -> Result<()> {
    let json = match args.format.as_str() {
        "json" => true,
        "text" => false,
        other => anyhow::bail!("Unknown output format: {} (expected text or json)", other),
    };

    let root = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()?.join(&args.path)
    };
    if !root.exists() {
        anyhow::bail!("Path not found: {:?}", root);
    }

    let mut config = load_config(&args)?;
    if json {
        // The JSON document is the only output.
        config.reporters.clear();
    }
    let fatal_severity = config.gate.fatal_severity;

    let mut loader = ContextLoader::new(&root)?;
    for pattern in &args.excludes {
        loader = loader.with_exclude(pattern)?;
    }
    for feature in &args.features {
        loader = loader.with_feature(feature.clone());
    }
    if let Some(routes) = &args.routes {
        loader = loader.with_routes(routes.clone());
    }
    let context = loader
        .load(args.module.clone())
        .with_context(|| format!("Failed to load project at {:?}", root))?;

    info!("Evaluating {} in {:?}", args.module, root);
    let agent = Arc::new(RuleAgent::new(config).context("Failed to configure rule agent")?);
    let result = agent
        .execute_with_timeout(context, Duration::from_secs(args.timeout_secs))
        .await
        .context("Rule agent evaluation failed")?;

    if json {
        let output = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{}", output);
    } else {
        for notice in agent.notice_board().active(chrono::Utc::now()) {
            println!("🔔 {}", notice.headline());
        }
    }

    if args.assert && result.gate_status == GateStatus::Fail {
        return Err(RuleError::GateFailed {
            status: result.gate_status,
            score: result.overall_score,
            fatal_issues: result.messages_with(fatal_severity),
        }
        .into());
    }
    Ok(())
}

/// Resolve the configuration from --config or --preset, then --fixtures.
fn load_config(args: &CheckArgs) -> Result<RuleAgentConfig> {
    let mut config = match &args.config {
        Some(path) => RuleAgentConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {:?}", path))?,
        None => RuleAgentConfig::named(&args.preset)?,
    };
    if let Some(dir) = &args.fixtures {
        config.fixtures = FixturePaths::in_dir(dir);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_agent::Preset;
    use tempfile::tempdir;

    fn args(preset: &str) -> CheckArgs {
        CheckArgs {
            path: PathBuf::from("."),
            module: "orders".into(),
            routes: None,
            features: Vec::new(),
            preset: preset.into(),
            config: None,
            fixtures: None,
            excludes: Vec::new(),
            format: "text".into(),
            assert: false,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_load_config_from_preset() {
        let config = load_config(&args("development")).unwrap();
        assert_eq!(config, RuleAgentConfig::preset(Preset::Development));
        assert!(load_config(&args("nightly")).is_err());
    }

    #[test]
    fn test_config_file_wins_over_preset() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("rule-agent.yaml");
        std::fs::write(&path, "gate:\n  warning_threshold: 3\nparallel: true\n").unwrap();

        let mut a = args("strict");
        a.config = Some(path);
        a.fixtures = Some(temp.path().to_path_buf());
        let config = load_config(&a).unwrap();

        assert_eq!(config.gate.warning_threshold, 3);
        assert!(config.parallel);
        assert_eq!(config.fixtures.dir.as_deref(), Some(temp.path()));
    }

    #[tokio::test]
    async fn test_assert_turns_failure_into_gate_error() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("components")).unwrap();
        std::fs::write(
            temp.path().join("components/Banner.tsx"),
            "export function Banner() { return <div style={{ color: \"#ff0000\" }}>Sale</div>; }",
        )
        .unwrap();

        let mut a = args("ci");
        a.path = temp.path().to_path_buf();
        a.format = "json".into();
        a.assert = true;

        let err = execute(a).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<RuleError>(), Some(RuleError::GateFailed { .. })));
    }

    #[tokio::test]
    async fn test_rejects_unknown_format() {
        let mut a = args("ci");
        a.format = "xml".into();
        assert!(execute(a).await.is_err());
    }
}
