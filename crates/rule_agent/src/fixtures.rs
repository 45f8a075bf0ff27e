//! Reference documents consulted by the checks.
//!
//! Every fixture has a built-in default so the agent works without any
//! files on disk. A configured path replaces the default wholesale.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FixturePaths;
use crate::error::{RuleError, RuleResult};

/// Brand and design token reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTokens {
    /// Token name to literal colour value
    pub colors: BTreeMap<String, String>,
    /// Spacing utilities that are part of the scale
    pub spacing_scale: Vec<String>,
    /// Radius utilities that are part of the scale
    pub radius_scale: Vec<String>,
    /// Shared layout components every UI module should use
    pub layout_components: Vec<String>,
    /// Identifiers that indicate theme switching support
    pub theme_markers: Vec<String>,
    /// Identifiers that indicate motion on interactive elements
    pub motion_markers: Vec<String>,
}

impl Default for StyleTokens {
    fn default() -> Self {
        let colors = [
            ("primary", "#7c3aed"),
            ("secondary", "#0ea5e9"),
            ("accent", "#f59e0b"),
            ("success", "#10b981"),
            ("danger", "#ef4444"),
            ("background", "#0b0b12"),
            ("foreground", "#f8fafc"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            colors,
            spacing_scale: strings(&["0", "0.5", "1", "2", "3", "4", "6", "8", "12", "16", "24"]),
            radius_scale: strings(&["none", "sm", "md", "lg", "xl", "2xl", "full"]),
            layout_components: strings(&["DashboardLayout", "PageShell", "AppShell", "PageHeader"]),
            theme_markers: strings(&["useTheme", "ThemeProvider", "ThemeToggle", "setTheme", "next-themes"]),
            motion_markers: strings(&["transition", "animate-", "framer-motion", "motion.", "duration-"]),
        }
    }
}

impl StyleTokens {
    /// Token name whose value equals `literal`, ignoring case.
    pub fn token_for_color(&self, literal: &str) -> Option<&str> {
        self.colors
            .iter()
            .find(|(_, value)| value.eq_ignore_ascii_case(literal))
            .map(|(name, _)| name.as_str())
    }
}

/// Allowed, required and forbidden directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryManifest {
    /// Top-level directories source files may live in
    pub allowed: Vec<String>,
    /// Directories that must contain at least one file of the change
    pub required: Vec<String>,
    /// Directory prefixes no file may live in
    pub forbidden: Vec<String>,
    /// Directory of the primary router
    pub primary_router: String,
    /// Directory of the legacy router that must not coexist with it
    pub legacy_router: String,
}

impl Default for DirectoryManifest {
    fn default() -> Self {
        Self {
            allowed: strings(&[
                "app", "components", "hooks", "lib", "utils", "services", "types", "styles", "config",
                "supabase", "public", "tests", "docs",
            ]),
            required: Vec::new(),
            forbidden: strings(&["src/pages", "legacy", "old", "tmp"]),
            primary_router: "app".to_string(),
            legacy_router: "pages".to_string(),
        }
    }
}

/// Shared UI kit components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiKitManifest {
    /// Directory the kit lives in
    pub directory: String,
    /// Import path of the kit
    pub import_path: String,
    /// Component names the kit provides
    pub components: Vec<String>,
}

impl Default for UiKitManifest {
    fn default() -> Self {
        Self {
            directory: "components/ui".to_string(),
            import_path: "@/components/ui".to_string(),
            components: strings(&[
                "Button", "Card", "Dialog", "Input", "Select", "Badge", "Table", "Tabs", "Tooltip",
                "Skeleton", "Toast", "Avatar", "Checkbox", "Textarea", "DropdownMenu",
            ]),
        }
    }
}

impl UiKitManifest {
    pub fn provides(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }
}

/// Expected payload of one event type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSchema {
    #[serde(default)]
    pub required_fields: Vec<String>,
}

/// Event bus and mission contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventContract {
    /// Modules that must emit at least one event
    pub emitting_modules: Vec<String>,
    /// Modules that must create at least one mission
    pub mission_modules: Vec<String>,
    /// Call sites that count as an event emission
    pub emission_calls: Vec<String>,
    /// Call sites that count as a mission creation
    pub mission_calls: Vec<String>,
    /// Known event types
    pub events: BTreeMap<String, EventSchema>,
}

impl Default for EventContract {
    fn default() -> Self {
        let events = [
            ("order.created", &["orderId", "tenantId", "total"][..]),
            ("order.updated", &["orderId", "tenantId", "status"][..]),
            ("product.synced", &["productId", "tenantId"][..]),
            ("inventory.low", &["productId", "tenantId", "quantity"][..]),
            ("campaign.scheduled", &["campaignId", "tenantId", "scheduledAt"][..]),
        ]
        .into_iter()
        .map(|(name, fields)| {
            (
                name.to_string(),
                EventSchema {
                    required_fields: strings(fields),
                },
            )
        })
        .collect();

        Self {
            emitting_modules: strings(&["orders", "products", "inventory", "erp-sync", "campaigns"]),
            mission_modules: strings(&["campaigns", "calendar", "inventory"]),
            emission_calls: strings(&["emitEvent(", "eventBus.emit(", "eventBus.publish(", "publishEvent("]),
            mission_calls: strings(&["createMission(", "missions.create(", "enqueueMission("]),
            events,
        }
    }
}

/// All fixtures, loaded once per agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    pub style_tokens: StyleTokens,
    pub directories: DirectoryManifest,
    pub ui_kit: UiKitManifest,
    pub event_contract: EventContract,
}

impl FixtureSet {
    /// Load the configured fixtures, keeping defaults for unset paths.
    pub fn load(paths: &FixturePaths) -> RuleResult<Self> {
        let mut set = Self::default();
        if let Some(path) = &paths.style_tokens {
            set.style_tokens = load_document(&paths.resolve(path))?;
        }
        if let Some(path) = &paths.directories {
            set.directories = load_document(&paths.resolve(path))?;
        }
        if let Some(path) = &paths.ui_kit {
            set.ui_kit = load_document(&paths.resolve(path))?;
        }
        if let Some(path) = &paths.event_contract {
            set.event_contract = load_document(&paths.resolve(path))?;
        }
        Ok(set)
    }
}

/// Read a YAML or JSON document, chosen by extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> RuleResult<T> {
    debug!("Loading fixture {:?}", path);
    let content = std::fs::read_to_string(path).map_err(|e| RuleError::Fixture {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| RuleError::Fixture {
        path: path.display().to_string(),
        message,
    })
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_populated() {
        let set = FixtureSet::default();
        assert_eq!(set.style_tokens.token_for_color("#7C3AED"), Some("primary"));
        assert!(set.ui_kit.provides("Button"));
        assert_eq!(set.directories.primary_router, "app");
        assert!(set.event_contract.events.contains_key("order.created"));
    }

    #[test]
    fn test_load_overrides_only_configured_fixtures() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("ui-kit.yaml"),
            "directory: src/ui\ncomponents:\n  - Button\n  - Banner\n",
        )
        .unwrap();

        let paths = FixturePaths {
            dir: Some(temp.path().to_path_buf()),
            ui_kit: Some("ui-kit.yaml".into()),
            ..Default::default()
        };
        let set = FixtureSet::load(&paths).unwrap();

        assert_eq!(set.ui_kit.directory, "src/ui");
        assert!(set.ui_kit.provides("Banner"));
        assert_eq!(set.ui_kit.import_path, "@/components/ui");
        assert_eq!(set.style_tokens, StyleTokens::default());
    }

    #[test]
    fn test_load_json_fixture() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("events.json");
        std::fs::write(
            &path,
            r#"{"emitting_modules": ["billing"], "events": {"invoice.paid": {"required_fields": ["invoiceId"]}}}"#,
        )
        .unwrap();

        let contract: EventContract = load_document(&path).unwrap();
        assert_eq!(contract.emitting_modules, vec!["billing".to_string()]);
        assert!(!contract.emission_calls.is_empty());
    }

    #[test]
    fn test_missing_fixture_is_an_error() {
        let paths = FixturePaths {
            directories: Some("/nonexistent/directories.yaml".into()),
            ..Default::default()
        };
        assert!(matches!(
            FixtureSet::load(&paths),
            Err(RuleError::Fixture { .. })
        ));
    }
}
