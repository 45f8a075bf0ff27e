//! Cross-module integration compliance.
//!
//! Checks that a module plugs into the shared platform: event emission and
//! mission creation where the contract expects them, well-formed event
//! payloads, one response envelope for its API, documentation for that API,
//! reuse of the UI kit and the usual async UI patterns.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::capability::{EventBusCapability, MissionCapability};
use crate::checks::{recommend, Check, CheckFamily, INTEGRATION_CHECK};
use crate::context::{FileDescriptor, FileKind, PolicyContext};
use crate::error::RuleResult;
use crate::fixtures::{FixtureSet, UiKitManifest};
use crate::heuristics::{Heuristic, PatternHeuristic, TokenHeuristic};
use crate::issue::{Category, CheckResult, Issue};

/// Default pass threshold.
pub const INTEGRATION_THRESHOLD: u32 = 75;

/// Features that count as API documentation.
const DOC_FEATURES: [&str; 2] = ["docs", "api-docs"];

/// Named predicates used by the integration check.
#[derive(Debug, Clone)]
pub struct IntegrationHeuristics {
    pub event_emission: TokenHeuristic,
    pub mission_creation: TokenHeuristic,
    pub event_payload: PatternHeuristic,
    pub data_envelope: PatternHeuristic,
    pub success_envelope: PatternHeuristic,
    pub raw_response: PatternHeuristic,
    pub doc_comment: PatternHeuristic,
    pub component_definition: PatternHeuristic,
    pub async_work: PatternHeuristic,
    pub error_boundary: PatternHeuristic,
    pub loading_boundary: PatternHeuristic,
    pub state_management: PatternHeuristic,
}

impl IntegrationHeuristics {
    pub fn compile(events: &dyn EventBusCapability, missions: &dyn MissionCapability) -> RuleResult<Self> {
        Ok(Self {
            event_emission: TokenHeuristic::new("event-emission", events.emission_calls().iter().cloned()),
            mission_creation: TokenHeuristic::new("mission-creation", missions.mission_calls().iter().cloned()),
            event_payload: PatternHeuristic::new(
                "event-payload",
                r#"\b(?:emitEvent|emit|publish|publishEvent)\(\s*['"]([\w.:-]+)['"]\s*,\s*\{([^{}]*)\}"#,
            )?,
            data_envelope: PatternHeuristic::new("data-envelope", r"json\(\s*\{\s*data\b")?,
            success_envelope: PatternHeuristic::new("success-envelope", r"json\(\s*\{\s*success\b")?,
            raw_response: PatternHeuristic::new(
                "raw-response",
                r"json\(\s*(?:\[|[a-z_$][\w$]*\s*[,)])",
            )?,
            doc_comment: PatternHeuristic::new("doc-comment", r"/\*\*")?,
            component_definition: PatternHeuristic::new(
                "component-definition",
                r"(?:function|const|class)\s+([A-Z][A-Za-z0-9]*)\b",
            )?,
            async_work: PatternHeuristic::new(
                "async-work",
                r"\bawait\s|\bfetch\(|\.then\(|\buse(?:Query|SWR|Mutation|InfiniteQuery)\b",
            )?,
            error_boundary: PatternHeuristic::new("error-boundary", r"ErrorBoundary|componentDidCatch")?,
            loading_boundary: PatternHeuristic::new(
                "loading-boundary",
                r"<Suspense\b|\bisLoading\b|\bisPending\b|\bSkeleton\b|\bloading\b",
            )?,
            state_management: PatternHeuristic::new(
                "state-management",
                r"\buse(?:Query|SWR|Mutation|Reducer|Store)\b|\bcreateContext\(|\bzustand\b|@reduxjs|\bjotai\b",
            )?,
        })
    }
}

/// Integration compliance check.
#[derive(Clone)]
pub struct IntegrationCheck {
    events: Arc<dyn EventBusCapability>,
    missions: Arc<dyn MissionCapability>,
    ui_kit: UiKitManifest,
    heuristics: IntegrationHeuristics,
    threshold: u32,
}

impl IntegrationCheck {
    pub fn new(
        events: Arc<dyn EventBusCapability>,
        missions: Arc<dyn MissionCapability>,
        ui_kit: UiKitManifest,
    ) -> RuleResult<Self> {
        let heuristics = IntegrationHeuristics::compile(events.as_ref(), missions.as_ref())?;
        Ok(Self {
            events,
            missions,
            ui_kit,
            heuristics,
            threshold: INTEGRATION_THRESHOLD,
        })
    }

    /// Build against the event contract and UI kit of a fixture set.
    pub fn from_fixtures(fixtures: &FixtureSet) -> RuleResult<Self> {
        let contract = Arc::new(fixtures.event_contract.clone());
        Self::new(contract.clone(), contract, fixtures.ui_kit.clone())
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn heuristics(&self) -> &IntegrationHeuristics {
        &self.heuristics
    }

    fn check_capabilities(&self, context: &PolicyContext, content_files: &[&FileDescriptor], issues: &mut Vec<Issue>) {
        let h = &self.heuristics;
        let module = context.module.as_str();

        if self.events.expects_emission(module) && !content_files.iter().any(|f| h.event_emission.matches(f)) {
            issues.push(
                Issue::warning(
                    "missing-event-emission",
                    Category::Events,
                    format!("Module '{}' is expected to emit events but never does", module),
                )
                .with_suggestion(format!(
                    "Publish domain events through {}",
                    self.events.emission_calls().first().map(String::as_str).unwrap_or("the event bus")
                )),
            );
        }

        if self.missions.expects_missions(module) && !content_files.iter().any(|f| h.mission_creation.matches(f)) {
            issues.push(
                Issue::warning(
                    "missing-mission-creation",
                    Category::Missions,
                    format!("Module '{}' is expected to create missions but never does", module),
                )
                .with_suggestion(format!(
                    "Create follow-up work with {}",
                    self.missions.mission_calls().first().map(String::as_str).unwrap_or("the mission API")
                )),
            );
        }
    }

    fn check_payloads(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        for caps in self.heuristics.event_payload.captures(file) {
            let (Some(event_type), Some(body)) = (caps.first().copied().flatten(), caps.get(1).copied().flatten())
            else {
                continue;
            };

            let Some(schema) = self.events.schema(event_type) else {
                issues.push(
                    Issue::info(
                        "unknown-event-type",
                        Category::Events,
                        format!("Event '{}' is not declared in the event contract", event_type),
                    )
                    .at_file(&file.path)
                    .with_suggestion("Declare the event type before emitting it"),
                );
                continue;
            };

            let Some(fields) = payload_fields(body) else {
                continue;
            };
            let missing: Vec<&str> = schema
                .required_fields
                .iter()
                .map(String::as_str)
                .filter(|f| !fields.contains(*f))
                .collect();
            if !missing.is_empty() {
                issues.push(
                    Issue::warning(
                        "incomplete-event-payload",
                        Category::Events,
                        format!("Event '{}' is missing field(s): {}", event_type, missing.join(", ")),
                    )
                    .at_file(&file.path)
                    .with_suggestion(format!(
                        "Include {} in the payload",
                        schema.required_fields.join(", ")
                    )),
                );
            }
        }
    }

    fn check_api(&self, context: &PolicyContext, issues: &mut Vec<Issue>) {
        let h = &self.heuristics;
        let api_files: Vec<&FileDescriptor> = context.files_of(FileKind::Api).collect();
        if api_files.is_empty() {
            return;
        }

        let mut shapes = BTreeSet::new();
        for file in &api_files {
            if h.data_envelope.matches(file) {
                shapes.insert("{ data }");
            }
            if h.success_envelope.matches(file) {
                shapes.insert("{ success }");
            }
            if h.raw_response.matches(file) {
                shapes.insert("raw");
            }
        }
        if shapes.len() > 1 {
            let shapes: Vec<&str> = shapes.into_iter().collect();
            issues.push(
                Issue::warning(
                    "inconsistent-response-envelope",
                    Category::Api,
                    format!("API responses mix envelopes: {}", shapes.join(", ")),
                )
                .with_suggestion("Answer every API call with the same { data, error } envelope"),
            );
        }

        let documented = api_files.iter().any(|f| h.doc_comment.matches(f))
            || context
                .files
                .iter()
                .any(|f| f.is_under("docs") || matches!(f.extension().as_str(), "md" | "mdx"))
            || DOC_FEATURES.iter().any(|d| context.has_feature(d));
        let has_source = api_files.iter().any(|f| f.has_content());
        if has_source && !documented {
            issues.push(
                Issue::info(
                    "missing-api-docs",
                    Category::Documentation,
                    format!("{} API file(s) without documentation", api_files.len()),
                )
                .with_suggestion("Document handlers with JSDoc or add a docs page"),
            );
        }
    }

    fn check_ui_kit(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        if file.is_under(&self.ui_kit.directory) {
            return;
        }

        let mut seen = BTreeSet::new();
        for caps in self.heuristics.component_definition.captures(file) {
            let Some(name) = caps.first().copied().flatten() else {
                continue;
            };
            if self.ui_kit.provides(name) && seen.insert(name) {
                issues.push(
                    Issue::warning(
                        "duplicate-ui-component",
                        Category::UiKit,
                        format!("'{}' reimplements a UI kit component", name),
                    )
                    .at_file(&file.path)
                    .with_suggestion(format!("Import {} from {}", name, self.ui_kit.import_path)),
                );
            }
        }
    }

    fn check_async_patterns(&self, context: &PolicyContext, content_files: &[&FileDescriptor], issues: &mut Vec<Issue>) {
        let h = &self.heuristics;
        let client_files: Vec<&FileDescriptor> = content_files
            .iter()
            .copied()
            .filter(|f| f.kind.is_ui() || f.kind == FileKind::Hook)
            .collect();
        if !client_files.iter().any(|f| h.async_work.matches(f)) {
            return;
        }

        let has_page = |stem: &str| context.files_of(FileKind::Page).any(|f| f.stem() == stem);

        if !has_page("error") && !client_files.iter().any(|f| h.error_boundary.matches(f)) {
            issues.push(
                Issue::warning(
                    "missing-error-boundary",
                    Category::StateManagement,
                    "Async UI work without an error boundary",
                )
                .with_suggestion("Add an error.tsx or wrap the tree in an ErrorBoundary"),
            );
        }

        if !has_page("loading") && !client_files.iter().any(|f| h.loading_boundary.matches(f)) {
            issues.push(
                Issue::info(
                    "missing-loading-boundary",
                    Category::StateManagement,
                    "Async UI work without Suspense or a loading state",
                )
                .with_suggestion("Add a loading.tsx or a Suspense fallback"),
            );
        }

        if !client_files.iter().any(|f| h.state_management.matches(f)) {
            issues.push(
                Issue::info(
                    "missing-state-management",
                    Category::StateManagement,
                    "Async UI work without a query cache or shared store",
                )
                .with_suggestion("Manage server state with useQuery"),
            );
        }
    }
}

impl fmt::Debug for IntegrationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationCheck")
            .field("ui_kit", &self.ui_kit)
            .field("heuristics", &self.heuristics)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// Top-level keys of an object literal body.
///
/// `None` when the body spreads another object, since its keys are unknown.
fn payload_fields(body: &str) -> Option<BTreeSet<String>> {
    let mut fields = BTreeSet::new();
    for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if entry.starts_with("...") {
            return None;
        }
        let key: String = entry
            .trim_matches(|c| c == '"' || c == '\'')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
            .collect();
        if !key.is_empty() {
            fields.insert(key);
        }
    }
    Some(fields)
}

fn recommendation(issue_type: &str) -> Option<&'static str> {
    Some(match issue_type {
        "missing-event-emission" | "incomplete-event-payload" | "unknown-event-type" => {
            "Publish contract-conformant events on the shared bus"
        }
        "missing-mission-creation" => "Create missions for work other modules must pick up",
        "inconsistent-response-envelope" => "Standardise API responses on one envelope",
        "missing-api-docs" => "Document the module's API",
        "duplicate-ui-component" => "Reuse the shared UI kit instead of rebuilding components",
        "missing-error-boundary" | "missing-loading-boundary" | "missing-state-management" => {
            "Wrap async UI in error and loading boundaries backed by the query cache"
        }
        _ => return None,
    })
}

impl Check for IntegrationCheck {
    fn name(&self) -> &str {
        INTEGRATION_CHECK
    }

    fn family(&self) -> CheckFamily {
        CheckFamily::Integration
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn run(&self, context: &PolicyContext) -> RuleResult<CheckResult> {
        let mut issues = Vec::new();
        let content_files: Vec<&FileDescriptor> = context.files.iter().filter(|f| f.has_content()).collect();

        if !content_files.is_empty() {
            self.check_capabilities(context, &content_files, &mut issues);
        }
        for file in &content_files {
            self.check_payloads(file, &mut issues);
            if file.kind.is_ui() {
                self.check_ui_kit(file, &mut issues);
            }
        }
        self.check_api(context, &mut issues);
        self.check_async_patterns(context, &content_files, &mut issues);

        debug!("{}: {} issue(s) for module {}", INTEGRATION_CHECK, issues.len(), context.module);
        let recommendations = recommend(&issues, recommendation);
        Ok(CheckResult::from_issues(INTEGRATION_CHECK, issues, self.threshold, recommendations))
    }
}
