//! Rule agent configuration and named presets.
//!
//! Configuration is loaded once when the agent is built and changed only
//! through [`ConfigPatch`] merges. Presets differ in how the gate treats
//! issues, never in which issues the checks emit.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::checks::{CheckFamily, INTEGRATION_CHECK, STRUCTURAL_CHECK, STYLE_CHECK};
use crate::error::{RuleError, RuleResult};
use crate::issue::Severity;
use crate::report::{NOTICE_REPORTER, STREAM_REPORTER};

/// Per-check settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Highest severity this check contributes to the gate
    #[serde(default = "default_ceiling")]
    pub severity_ceiling: Severity,
    /// Overrides the check's own pass threshold
    #[serde(default)]
    pub pass_threshold: Option<u32>,
}

fn default_true() -> bool {
    true
}

fn default_ceiling() -> Severity {
    Severity::Error
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            severity_ceiling: Severity::Error,
            pass_threshold: None,
        }
    }
}

impl CheckSettings {
    pub fn with_ceiling(severity_ceiling: Severity) -> Self {
        Self {
            severity_ceiling,
            ..Default::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Gating policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub fail_on_error: bool,
    /// Warning count that forces failure; `0` disables the rule
    #[serde(default)]
    pub warning_threshold: usize,
    /// Scores below this yield at best a `warning` verdict
    #[serde(default = "default_pass_score")]
    pub pass_score: u32,
    /// Severity reported by the assert entrypoint
    #[serde(default = "default_ceiling")]
    pub fatal_severity: Severity,
}

fn default_pass_score() -> u32 {
    80
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fail_on_error: true,
            warning_threshold: 10,
            pass_score: default_pass_score(),
            fatal_severity: Severity::Error,
        }
    }
}

/// Per-family weights used for the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub style: f64,
    pub structural: f64,
    pub integration: f64,
    /// Weight of checks outside the three default families
    pub fallback: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            style: 0.4,
            structural: 0.4,
            integration: 0.2,
            fallback: 0.1,
        }
    }
}

impl ScoreWeights {
    pub fn weight_for(&self, family: CheckFamily) -> f64 {
        match family {
            CheckFamily::Style => self.style,
            CheckFamily::Structural => self.structural,
            CheckFamily::Integration => self.integration,
            CheckFamily::Custom => self.fallback,
        }
    }
}

/// Where fixture documents live.
///
/// An unset path keeps the built-in default. A path relative to `dir` is
/// resolved against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixturePaths {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub style_tokens: Option<PathBuf>,
    #[serde(default)]
    pub directories: Option<PathBuf>,
    #[serde(default)]
    pub ui_kit: Option<PathBuf>,
    #[serde(default)]
    pub event_contract: Option<PathBuf>,
}

const FIXTURE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

impl FixturePaths {
    /// Pick up the conventionally named documents present in `dir`
    /// (`style-tokens`, `directories`, `ui-kit`, `event-contract`, as
    /// `.yaml`, `.yml` or `.json`). Absent documents keep their defaults.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let find = |stem: &str| {
            FIXTURE_EXTENSIONS
                .iter()
                .map(|ext| PathBuf::from(format!("{}.{}", stem, ext)))
                .find(|name| dir.join(name).is_file())
        };
        let style_tokens = find("style-tokens");
        let directories = find("directories");
        let ui_kit = find("ui-kit");
        let event_contract = find("event-contract");

        Self {
            dir: Some(dir),
            style_tokens,
            directories,
            ui_kit,
            event_contract,
        }
    }

    /// Resolve a configured path against `dir`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Named configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Strict,
    Development,
    Ci,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Strict, Preset::Development, Preset::Ci];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Strict => "strict",
            Preset::Development => "development",
            Preset::Ci => "ci",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Preset::Strict),
            "development" | "dev" => Ok(Preset::Development),
            "ci" => Ok(Preset::Ci),
            other => Err(RuleError::UnknownPreset(other.to_string())),
        }
    }
}

/// Full rule agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAgentConfig {
    /// Settings keyed by check name; missing checks use the defaults
    #[serde(default)]
    pub checks: BTreeMap<String, CheckSettings>,
    /// Reporter ids, in dispatch order
    #[serde(default = "default_reporters")]
    pub reporters: Vec<String>,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub fixtures: FixturePaths,
    /// Run checks on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_reporters() -> Vec<String> {
    vec![STREAM_REPORTER.to_string()]
}

impl Default for RuleAgentConfig {
    fn default() -> Self {
        Self::preset(Preset::Ci)
    }
}

impl RuleAgentConfig {
    /// Build the configuration for a preset.
    pub fn preset(preset: Preset) -> Self {
        let mut checks = BTreeMap::new();
        let gate = match preset {
            Preset::Strict => {
                for name in [STYLE_CHECK, STRUCTURAL_CHECK, INTEGRATION_CHECK] {
                    checks.insert(name.to_string(), CheckSettings::default());
                }
                GateConfig {
                    enabled: true,
                    fail_on_error: true,
                    warning_threshold: 5,
                    pass_score: 90,
                    fatal_severity: Severity::Error,
                }
            }
            Preset::Development => {
                checks.insert(STYLE_CHECK.to_string(), CheckSettings::with_ceiling(Severity::Warning));
                checks.insert(STRUCTURAL_CHECK.to_string(), CheckSettings::default());
                checks.insert(
                    INTEGRATION_CHECK.to_string(),
                    CheckSettings::with_ceiling(Severity::Warning),
                );
                GateConfig {
                    enabled: false,
                    fail_on_error: false,
                    warning_threshold: 0,
                    pass_score: 70,
                    fatal_severity: Severity::Error,
                }
            }
            Preset::Ci => {
                for name in [STYLE_CHECK, STRUCTURAL_CHECK, INTEGRATION_CHECK] {
                    checks.insert(name.to_string(), CheckSettings::default());
                }
                GateConfig {
                    enabled: true,
                    fail_on_error: true,
                    warning_threshold: 10,
                    pass_score: 80,
                    fatal_severity: Severity::Error,
                }
            }
        };

        let reporters = match preset {
            Preset::Development => vec![STREAM_REPORTER.to_string(), NOTICE_REPORTER.to_string()],
            Preset::Strict | Preset::Ci => default_reporters(),
        };

        Self {
            checks,
            reporters,
            gate,
            weights: ScoreWeights::default(),
            fixtures: FixturePaths::default(),
            parallel: false,
        }
    }

    /// Parse a preset name and build its configuration.
    pub fn named(name: &str) -> RuleResult<Self> {
        Ok(Self::preset(name.parse()?))
    }

    /// Settings for a check, falling back to the defaults.
    pub fn check_settings(&self, name: &str) -> CheckSettings {
        self.checks.get(name).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.check_settings(name).enabled
    }

    /// Load a configuration from a YAML file.
    pub fn from_file(path: &Path) -> RuleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> RuleResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> RuleResult<String> {
        serde_yaml::to_string(self).map_err(RuleError::from)
    }

    /// Reject values the scorer and gate cannot work with.
    pub fn validate(&self) -> RuleResult<()> {
        if self.gate.pass_score > 100 {
            return Err(RuleError::InvalidConfiguration(format!(
                "gate.pass_score must be within 0..=100, got {}",
                self.gate.pass_score
            )));
        }
        for (name, settings) in &self.checks {
            if let Some(threshold) = settings.pass_threshold {
                if threshold > 100 {
                    return Err(RuleError::InvalidConfiguration(format!(
                        "checks.{}.pass_threshold must be within 0..=100, got {}",
                        name, threshold
                    )));
                }
            }
        }
        let w = &self.weights;
        if [w.style, w.structural, w.integration, w.fallback]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(RuleError::InvalidConfiguration(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply a patch and validate the outcome.
    pub fn merge(&mut self, patch: ConfigPatch) -> RuleResult<()> {
        let mut next = self.clone();
        for (name, settings) in patch.checks {
            let entry = next.checks.entry(name).or_default();
            if let Some(enabled) = settings.enabled {
                entry.enabled = enabled;
            }
            if let Some(ceiling) = settings.severity_ceiling {
                entry.severity_ceiling = ceiling;
            }
            if let Some(threshold) = settings.pass_threshold {
                entry.pass_threshold = Some(threshold);
            }
        }
        if let Some(reporters) = patch.reporters {
            next.reporters = reporters;
        }
        if let Some(gate) = patch.gate {
            if let Some(v) = gate.enabled {
                next.gate.enabled = v;
            }
            if let Some(v) = gate.fail_on_error {
                next.gate.fail_on_error = v;
            }
            if let Some(v) = gate.warning_threshold {
                next.gate.warning_threshold = v;
            }
            if let Some(v) = gate.pass_score {
                next.gate.pass_score = v;
            }
            if let Some(v) = gate.fatal_severity {
                next.gate.fatal_severity = v;
            }
        }
        if let Some(weights) = patch.weights {
            next.weights = weights;
        }
        if let Some(fixtures) = patch.fixtures {
            next.fixtures = fixtures;
        }
        if let Some(parallel) = patch.parallel {
            next.parallel = parallel;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// Partial check settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSettingsPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub severity_ceiling: Option<Severity>,
    #[serde(default)]
    pub pass_threshold: Option<u32>,
}

/// Partial gate settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub fail_on_error: Option<bool>,
    #[serde(default)]
    pub warning_threshold: Option<usize>,
    #[serde(default)]
    pub pass_score: Option<u32>,
    #[serde(default)]
    pub fatal_severity: Option<Severity>,
}

/// Partial configuration merged into a live one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default)]
    pub checks: BTreeMap<String, CheckSettingsPatch>,
    #[serde(default)]
    pub reporters: Option<Vec<String>>,
    #[serde(default)]
    pub gate: Option<GatePatch>,
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
    #[serde(default)]
    pub fixtures: Option<FixturePaths>,
    #[serde(default)]
    pub parallel: Option<bool>,
}

impl ConfigPatch {
    pub fn from_yaml(yaml: &str) -> RuleResult<Self> {
        serde_yaml::from_str(yaml).map_err(RuleError::from)
    }

    /// Enable or disable one check.
    pub fn check_enabled(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.checks.entry(name.into()).or_default().enabled = Some(enabled);
        self
    }

    pub fn gate(mut self, gate: GatePatch) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn reporters(mut self, reporters: Vec<String>) -> Self {
        self.reporters = Some(reporters);
        self
    }
}
