//! Presets command - Print built-in configurations.

use anyhow::{Context, Result};
use clap::Args;

use rule_agent::{Preset, RuleAgentConfig};

#[derive(Args)]
pub struct PresetsArgs {
    /// Preset to print (strict, development, ci); all when omitted
    pub name: Option<String>,
}

pub fn execute(args: PresetsArgs) -> Result<()> {
    print!("{}", render(args.name.as_deref())?);
    Ok(())
}

fn render(name: Option<&str>) -> Result<String> {
    let presets = match name {
        Some(name) => vec![name.parse::<Preset>()?],
        None => Preset::ALL.to_vec(),
    };

    let mut output = String::new();
    for (i, preset) in presets.into_iter().enumerate() {
        if i > 0 {
            output.push_str("---\n");
        }
        let yaml = RuleAgentConfig::preset(preset)
            .to_yaml()
            .with_context(|| format!("Failed to serialize preset {}", preset))?;
        output.push_str(&format!("# {}\n{}", preset, yaml));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_preset_round_trips() {
        let text = render(Some("strict")).unwrap();
        assert!(text.starts_with("# strict\n"));

        let config = RuleAgentConfig::from_yaml(&text).unwrap();
        assert_eq!(config, RuleAgentConfig::preset(Preset::Strict));
    }

    #[test]
    fn test_render_all_presets() {
        let text = render(None).unwrap();
        assert_eq!(text.matches("---\n").count(), 2);
        assert!(text.contains("# development\n"));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(render(Some("nightly")).is_err());
    }
}
