//! Integration tests for the rule agent pipeline.

use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::tempdir;

use rule_agent::checks::{INTEGRATION_CHECK, STRUCTURAL_CHECK, STYLE_CHECK};
use rule_agent::config::FixturePaths;
use rule_agent::fixtures::{DirectoryManifest, StyleTokens};
use rule_agent::{
    Category, Check, CheckFamily, CheckResult, ContextLoader, FileDescriptor, FileKind, GateStatus, HttpMethod,
    Issue, PolicyContext, Preset, Reporter, RouteDescriptor, RuleAgent, RuleAgentConfig, RuleAgentResult, RuleError,
    RuleResult, Severity, StreamReporter,
};

const SECURE_ORDERS_ROUTE: &str = r#"import { z } from "zod";
import { NextResponse } from "next/server";
import { createClient } from "@/lib/supabase/server";
import { rateLimit } from "@/lib/rate-limit";

const CreateOrder = z.object({ total: z.number().positive() });

export async function POST(request: Request) {
  try {
    await rateLimit(request);
    const supabase = createClient();
    const { data: { user } } = await supabase.auth.getUser();
    if (!user) {
      return NextResponse.json({ error: "Unauthorized" }, { status: 401 });
    }
    const body = CreateOrder.parse(await request.json());
    const tenantId = user.app_metadata.tenant_id;
    const { data } = await supabase
      .from("orders")
      .insert({ ...body, tenant_id: tenantId })
      .select()
      .eq("tenant_id", tenantId);
    await emitEvent("order.created", { orderId: data.id, tenantId, total: body.total });
    return NextResponse.json({ data });
  } catch (err) {
    return NextResponse.json({ error: "Could not create order" }, { status: 500 });
  }
}
"#;

const BRANDING_VIOLATION: &str = r##"export function Banner() {
  return <div style={{ color: "#ff0000" }}>Sale</div>;
}
"##;

/// Configuration without reporters, so tests stay silent.
fn quiet(preset: Preset) -> RuleAgentConfig {
    let mut config = RuleAgentConfig::preset(preset);
    config.reporters.clear();
    config
}

fn agent(preset: Preset) -> RuleAgent {
    RuleAgent::new(quiet(preset)).unwrap()
}

fn branding_context() -> PolicyContext {
    PolicyContext::new("marketing")
        .with_file(FileDescriptor::new("components/Banner.tsx", FileKind::Component).with_content(BRANDING_VIOLATION))
}

/// Inline style plus literal colour is an error and caps the style score.
#[test]
fn test_branding_violation_fails_style_check() {
    let result = agent(Preset::Ci).execute(&branding_context());
    let style = result.check(STYLE_CHECK).unwrap();

    assert!(style.count(Severity::Error) >= 1);
    assert!(style.score <= 80);
    assert!(!style.passed);
    assert_eq!(result.gate_status, GateStatus::Fail);
    assert!(!result.passed);
}

/// A fully protected route with a secure handler has no structural errors.
#[test]
fn test_protected_route_has_no_structural_errors() {
    let context = PolicyContext::new("orders")
        .with_file(FileDescriptor::new("app/api/orders/route.ts", FileKind::Api).with_content(SECURE_ORDERS_ROUTE))
        .with_route(RouteDescriptor::api("/api/orders", HttpMethod::Post).fully_protected());

    let result = agent(Preset::Ci).execute(&context);
    let structural = result.check(STRUCTURAL_CHECK).unwrap();

    assert_eq!(
        structural.count(Severity::Error),
        0,
        "unexpected errors: {:?}",
        structural.issues
    );
}

/// An empty context is well formed, scores 100 and passes.
#[test]
fn test_empty_context_passes() {
    let result = agent(Preset::Ci).execute(&PolicyContext::new("orders"));

    assert_eq!(result.check_results.len(), 3);
    assert!(result.check_results.iter().all(|r| r.issues.is_empty()));
    assert_eq!(result.summary.total, 0);
    assert_eq!(result.overall_score, 100);
    assert_eq!(result.gate_status, GateStatus::Pass);
    assert!(result.passed);
}

/// Presets change the verdict, never the findings.
#[test]
fn test_presets_differ_only_in_gate() {
    assert!(RuleAgentConfig::preset(Preset::Ci).gate.fail_on_error);

    let context = branding_context().with_file(
        FileDescriptor::new("app/api/promo/route.ts", FileKind::Api)
            .with_content("export async function GET() { return Response.json(promos); }"),
    );
    let ci = agent(Preset::Ci).execute(&context);
    let dev = agent(Preset::Development).execute(&context);

    assert_eq!(ci.check_results, dev.check_results);
    assert_eq!(ci.overall_score, dev.overall_score);
    assert_eq!(ci.summary, dev.summary);
    assert_eq!(ci.gate_status, GateStatus::Fail);
    assert_ne!(dev.gate_status, GateStatus::Fail);
}

/// The stream report's summary block reads back to the same counters.
#[test]
fn test_stream_summary_round_trip() {
    let context = branding_context();
    let result = agent(Preset::Strict).execute(&context);

    let text = StreamReporter::render(&result, &context);
    assert_eq!(StreamReporter::parse_summary(&text).unwrap(), result.summary);
}

#[test]
fn test_result_invariants_hold_across_contexts() {
    let contexts = vec![
        PolicyContext::new("orders"),
        branding_context(),
        PolicyContext::new("orders")
            .with_file(FileDescriptor::new("app/api/orders/route.ts", FileKind::Api).with_content(SECURE_ORDERS_ROUTE)),
        PolicyContext::new("campaigns")
            .with_file(FileDescriptor::new("legacy/a.js", FileKind::Util).with_content("console.log(1)"))
            .with_route(RouteDescriptor::api("/api/campaigns", HttpMethod::Delete))
            .with_route(RouteDescriptor::page("/campaigns")),
        PolicyContext::new("ci-only").with_file(FileDescriptor::new("components/A.tsx", FileKind::Component)),
    ];

    for preset in Preset::ALL {
        let agent = agent(preset);
        for context in &contexts {
            let result = agent.execute(context);
            assert!(result.overall_score <= 100);
            assert_eq!(result.passed, result.gate_status == GateStatus::Pass);
            assert!(result.check_results.iter().all(|r| r.score <= 100));
            assert!(result.completed_at >= result.started_at);
        }
    }
}

#[test]
fn test_checks_are_deterministic() {
    let context = branding_context();
    let agent = agent(Preset::Ci);
    let first = agent.execute(&context);
    let second = agent.execute(&context);

    assert_eq!(first.check_results, second.check_results);
    assert_eq!(first.recommendations, second.recommendations);
}

#[test]
fn test_score_never_increases_as_issues_are_added() {
    let mut issues = Vec::new();
    let mut last = CheckResult::from_issues("c", issues.clone(), 80, Vec::new()).score;
    for i in 0..12 {
        let severity = [Severity::Info, Severity::Warning, Severity::Error][i % 3];
        issues.push(Issue::new("x", severity, Category::Conventions, "x"));
        let score = CheckResult::from_issues("c", issues.clone(), 80, Vec::new()).score;
        assert!(score <= last);
        last = score;
    }
    assert_eq!(last, 0);
}

struct OneErrorCheck;

impl Check for OneErrorCheck {
    fn name(&self) -> &str {
        "one-error"
    }

    fn family(&self) -> CheckFamily {
        CheckFamily::Custom
    }

    fn threshold(&self) -> u32 {
        0
    }

    fn run(&self, _context: &PolicyContext) -> RuleResult<CheckResult> {
        let issue = Issue::error("custom", Category::Conventions, "Custom rule violated");
        Ok(CheckResult::from_issues("one-error", vec![issue], 0, Vec::new()))
    }
}

/// One error under fail-on-error fails the run even with a high score.
#[test]
fn test_single_error_fails_regardless_of_score() {
    let agent = RuleAgent::bare(quiet(Preset::Ci))
        .unwrap()
        .with_check(Arc::new(OneErrorCheck));
    let result = agent.execute(&PolicyContext::new("x"));

    assert_eq!(result.overall_score, 80);
    assert_eq!(result.gate_status, GateStatus::Fail);
}

struct SlowCheck;

impl Check for SlowCheck {
    fn name(&self) -> &str {
        "slow"
    }

    fn family(&self) -> CheckFamily {
        CheckFamily::Custom
    }

    fn threshold(&self) -> u32 {
        0
    }

    fn run(&self, _context: &PolicyContext) -> RuleResult<CheckResult> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(CheckResult::from_issues("slow", Vec::new(), 0, Vec::new()))
    }
}

#[tokio::test]
async fn test_execute_with_timeout_expires() {
    let agent = Arc::new(RuleAgent::bare(quiet(Preset::Ci)).unwrap().with_check(Arc::new(SlowCheck)));

    let err = agent
        .execute_with_timeout(PolicyContext::new("x"), Duration::from_millis(20))
        .await
        .unwrap_err();
    assert!(matches!(err, RuleError::Timeout(20)));
}

struct FailingReporter;

impl Reporter for FailingReporter {
    fn id(&self) -> &'static str {
        "failing"
    }

    fn report(&self, _result: &RuleAgentResult, _context: &PolicyContext) -> RuleResult<()> {
        Err(RuleError::reporter_failed("failing", "destination unavailable"))
    }
}

#[derive(Default)]
struct RecordingReporter {
    seen: Mutex<Vec<(String, GateStatus)>>,
}

impl Reporter for RecordingReporter {
    fn id(&self) -> &'static str {
        "recording"
    }

    fn report(&self, result: &RuleAgentResult, _context: &PolicyContext) -> RuleResult<()> {
        self.seen
            .lock()
            .unwrap()
            .push((result.module.clone(), result.gate_status));
        Ok(())
    }
}

/// A failing reporter neither aborts dispatch nor changes the verdict.
#[test]
fn test_reporter_failure_is_isolated() {
    let recorder = Arc::new(RecordingReporter::default());
    let mut config = quiet(Preset::Ci);
    config.reporters = vec!["failing".into(), "recording".into()];

    let agent = RuleAgent::new(config)
        .unwrap()
        .with_reporter(Arc::new(FailingReporter))
        .with_reporter(recorder.clone());
    let result = agent.execute(&branding_context());

    assert_eq!(result.gate_status, GateStatus::Fail);
    assert_eq!(
        *recorder.seen.lock().unwrap(),
        vec![("marketing".to_string(), GateStatus::Fail)]
    );
}

#[test]
fn test_development_preset_posts_notices() {
    let agent = RuleAgent::new(RuleAgentConfig::preset(Preset::Development)).unwrap();
    agent
        .update_config(rule_agent::ConfigPatch::default().reporters(vec!["notice".into()]))
        .unwrap();

    agent.execute(&branding_context());

    let notices = agent.notice_board().active(chrono::Utc::now());
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].module, "marketing");
}

#[test]
fn test_assert_compliant_escalates_failures_only() {
    let agent = agent(Preset::Ci);

    assert!(agent.assert_compliant(&PolicyContext::new("orders")).is_ok());

    let err = agent.assert_compliant(&branding_context()).unwrap_err();
    match err {
        RuleError::GateFailed { status, fatal_issues, .. } => {
            assert_eq!(status, GateStatus::Fail);
            assert!(fatal_issues.iter().any(|m| m.starts_with("[style-compliance]")));
            assert!(fatal_issues.iter().all(|m| m.contains("components/Banner.tsx")));
        }
        other => panic!("unexpected error: {}", other),
    }
}

/// Load a project from disk and evaluate it end to end.
#[test]
fn test_loaded_project_end_to_end() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("app/api/orders")).unwrap();
    fs::create_dir_all(root.join("components")).unwrap();
    fs::create_dir_all(root.join("node_modules/zod")).unwrap();
    fs::write(root.join("app/api/orders/route.ts"), SECURE_ORDERS_ROUTE).unwrap();
    fs::write(root.join("components/Banner.tsx"), BRANDING_VIOLATION).unwrap();
    fs::write(root.join("node_modules/zod/index.js"), "module.exports = {};").unwrap();
    fs::write(
        root.join("routes.yaml"),
        "routes:\n  - path: /api/orders\n    method: POST\n    kind: api\n    has_auth: true\n    has_row_isolation: true\n    has_validation: true\n    has_rate_limit: true\n",
    )
    .unwrap();

    let context = ContextLoader::new(root)
        .unwrap()
        .with_routes(root.join("routes.yaml"))
        .load("orders")
        .unwrap();
    assert!(context.files.iter().all(|f| !f.path.starts_with("node_modules")));
    let route = context.files.iter().find(|f| f.kind == FileKind::Api).unwrap();
    assert!(route.dependencies.contains(&"zod".to_string()));
    assert!(route.exports.contains(&"POST".to_string()));

    let result = agent(Preset::Ci).execute(&context);

    assert_eq!(result.check(STRUCTURAL_CHECK).unwrap().count(Severity::Error), 0);
    assert!(result.check(STYLE_CHECK).unwrap().count(Severity::Error) >= 1);
    let integration = result.check(INTEGRATION_CHECK).unwrap();
    assert!(!integration.issues.iter().any(|i| i.issue_type == "missing-event-emission"));
    assert_eq!(result.gate_status, GateStatus::Fail);
}

/// A fixture directory may override only some documents.
#[test]
fn test_partial_fixture_directory_keeps_defaults() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("ui-kit.yaml"), "components:\n  - Button\n  - PromoBanner\n").unwrap();

    let mut config = quiet(Preset::Ci);
    config.fixtures = FixturePaths::in_dir(temp.path());
    let agent = RuleAgent::new(config).unwrap();

    assert!(agent.fixtures().ui_kit.provides("PromoBanner"));
    assert_eq!(agent.fixtures().style_tokens, StyleTokens::default());
    assert_eq!(agent.fixtures().directories, DirectoryManifest::default());
}
