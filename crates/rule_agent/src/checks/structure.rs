//! Structural and security compliance.
//!
//! Directory placement, typing and import conventions for every source
//! file; validation, auth, tenant isolation and rate limiting for API
//! handlers; client-component hygiene for UI files; and the declared
//! safeguards of every route.

use tracing::debug;

use crate::checks::{recommend, Check, CheckFamily, STRUCTURAL_CHECK};
use crate::context::{is_hook_name, FileDescriptor, FileKind, PolicyContext, RouteDescriptor, RouteKind};
use crate::error::RuleResult;
use crate::fixtures::DirectoryManifest;
use crate::heuristics::{FnHeuristic, Heuristic, PatternHeuristic};
use crate::issue::{Category, CheckResult, Issue};

/// Default pass threshold; structural defects are the least tolerable.
pub const STRUCTURAL_THRESHOLD: u32 = 85;

/// Files longer than this many lines get an informational finding.
pub const MAX_FILE_LINES: usize = 400;

/// Named predicates used by the structural check.
#[derive(Debug, Clone)]
pub struct StructureHeuristics {
    pub untyped_source: FnHeuristic,
    pub explicit_any: PatternHeuristic,
    pub parent_relative_import: PatternHeuristic,
    pub debug_statement: PatternHeuristic,
    pub default_export: PatternHeuristic,
    pub named_export: PatternHeuristic,
    pub route_handler_export: PatternHeuristic,
    pub schema_validation: PatternHeuristic,
    pub auth_check: PatternHeuristic,
    pub db_query: PatternHeuristic,
    pub tenant_filter: PatternHeuristic,
    pub rate_limit: PatternHeuristic,
    pub error_handling: PatternHeuristic,
    pub empty_catch: PatternHeuristic,
    pub sensitive_logging: PatternHeuristic,
    pub client_directive: PatternHeuristic,
    pub interactivity: PatternHeuristic,
    pub misplaced_directive: FnHeuristic,
    pub raw_fetch: PatternHeuristic,
    pub query_cache: PatternHeuristic,
    pub imports_after_code: FnHeuristic,
    pub oversized: FnHeuristic,
}

impl StructureHeuristics {
    pub fn compile() -> RuleResult<Self> {
        Ok(Self {
            untyped_source: FnHeuristic::new("untyped-source", |f| {
                f.kind.is_source() && matches!(f.extension().as_str(), "js" | "jsx" | "mjs" | "cjs")
            }),
            explicit_any: PatternHeuristic::new(
                "explicit-any",
                r":\s*any\b|\bas\s+any\b|<any>|\bany\[\]",
            )?,
            parent_relative_import: PatternHeuristic::new(
                "parent-relative-import",
                r#"from\s+['"]\.\./"#,
            )?,
            debug_statement: PatternHeuristic::new(
                "debug-statement",
                r"console\.(?:log|debug)\(|\bdebugger;",
            )?,
            default_export: PatternHeuristic::new("default-export", r"export\s+default\b")?,
            named_export: PatternHeuristic::new(
                "named-export",
                r"export\s+(?:async\s+)?(?:function|const|let|class|interface|type|enum)\s+\w+|export\s*\{",
            )?,
            route_handler_export: PatternHeuristic::new(
                "route-handler-export",
                r"export\s+(?:async\s+)?function\s+(?:GET|POST|PUT|DELETE|PATCH)\b|export\s+const\s+(?:GET|POST|PUT|DELETE|PATCH)\b|export\s+default\s+(?:async\s+)?function\s+handler\b",
            )?,
            schema_validation: PatternHeuristic::new(
                "schema-validation",
                r#"from\s+['"]zod['"]|\bz\.object\(|\.safeParse\(|\.parse\(\s*(?:await\s+)?(?:body|req|request)\b|\byup\.|from\s+['"]valibot['"]"#,
            )?,
            auth_check: PatternHeuristic::new(
                "auth-check",
                r"\bgetUser\(|\bgetSession\(|\bgetServerSession\(|\bauth\(\)|\brequireAuth\b|\bwithAuth\b|\bcurrentUser\(",
            )?,
            db_query: PatternHeuristic::new(
                "db-query",
                r#"\.from\(\s*['"]|\bprisma\.\w+\.\w+\(|\bdb\.\w+\("#,
            )?,
            tenant_filter: PatternHeuristic::new(
                "tenant-filter",
                r"tenant_id|tenantId|organization_id|organizationId|\buser_id\b|\buserId\b",
            )?,
            rate_limit: PatternHeuristic::new(
                "rate-limit",
                r"(?i)rate_?limit|\blimiter\b",
            )?,
            error_handling: PatternHeuristic::new("error-handling", r"\btry\s*\{|\.catch\(")?,
            empty_catch: PatternHeuristic::new(
                "empty-catch",
                r"catch\s*(?:\(\s*\w*\s*\))?\s*\{\s*\}",
            )?,
            sensitive_logging: PatternHeuristic::new(
                "sensitive-logging",
                r"console\.\w+\([^)]*(?i:password|token|secret|api_?key|authorization|cookie)",
            )?,
            client_directive: PatternHeuristic::new(
                "client-directive",
                r#"(?m)^\s*['"]use client['"];?"#,
            )?,
            interactivity: PatternHeuristic::new(
                "interactivity",
                r"\buse(?:State|Effect|Reducer|Ref|Transition|Optimistic|LayoutEffect|Context)\b|\bon[A-Z]\w*=|\bwindow\.|\bdocument\.|\blocalStorage\b",
            )?,
            misplaced_directive: FnHeuristic::new("misplaced-client-directive", |f| {
                let Some(content) = f.content.as_deref() else {
                    return false;
                };
                let mut seen_code = false;
                for line in significant_lines(content) {
                    if is_client_directive(line) {
                        return seen_code;
                    }
                    seen_code = true;
                }
                false
            }),
            raw_fetch: PatternHeuristic::new("raw-fetch", r"\bfetch\(|\baxios\.")?,
            query_cache: PatternHeuristic::new(
                "query-cache",
                r#"\buse(?:Query|SWR|InfiniteQuery|SuspenseQuery|Mutation)\b|@tanstack/react-query|from\s+['"]swr['"]"#,
            )?,
            imports_after_code: FnHeuristic::new("imports-after-code", |f| {
                let Some(content) = f.content.as_deref() else {
                    return false;
                };
                let mut seen_code = false;
                for line in significant_lines(content) {
                    let is_import = line.starts_with("import ") || line.starts_with("import{");
                    if is_import && seen_code {
                        return true;
                    }
                    if !is_import && !is_client_directive(line) && !line.starts_with("export ") {
                        seen_code = true;
                    }
                }
                false
            }),
            oversized: FnHeuristic::new("oversized-file", |f| {
                f.content.as_deref().is_some_and(|c| c.lines().count() > MAX_FILE_LINES)
            }),
        })
    }
}

/// Trimmed lines that are neither blank nor comments.
fn significant_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with("/*") && !l.starts_with('*'))
}

fn is_client_directive(line: &str) -> bool {
    matches!(
        line.trim_end_matches(';'),
        "\"use client\"" | "'use client'"
    )
}

/// Structural and security compliance check.
#[derive(Debug, Clone)]
pub struct StructuralCheck {
    manifest: DirectoryManifest,
    heuristics: StructureHeuristics,
    threshold: u32,
}

impl StructuralCheck {
    pub fn new(manifest: DirectoryManifest) -> RuleResult<Self> {
        Ok(Self {
            manifest,
            heuristics: StructureHeuristics::compile()?,
            threshold: STRUCTURAL_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn heuristics(&self) -> &StructureHeuristics {
        &self.heuristics
    }

    fn check_directories(&self, context: &PolicyContext, issues: &mut Vec<Issue>) {
        let m = &self.manifest;

        for file in &context.files {
            if let Some(forbidden) = m
                .forbidden
                .iter()
                .find(|dir| file.is_under(dir))
            {
                issues.push(
                    Issue::error(
                        "forbidden-directory",
                        Category::Structure,
                        format!("File lives in forbidden directory '{}'", forbidden),
                    )
                    .at_file(&file.path)
                    .with_suggestion("Move the file into one of the allowed directories"),
                );
                continue;
            }

            if let Some(top) = file.top_level_dir() {
                let allowed = m.allowed.iter().any(|a| a == top)
                    || top == m.primary_router
                    || top == m.legacy_router;
                if !allowed {
                    issues.push(
                        Issue::warning(
                            "unexpected-directory",
                            Category::Structure,
                            format!("Top-level directory '{}' is not in the allow-list", top),
                        )
                        .at_file(&file.path)
                        .with_suggestion(format!("Use one of: {}", m.allowed.join(", "))),
                    );
                }
            }
        }

        let uses_primary = context.files.iter().any(|f| f.is_under(&m.primary_router));
        let uses_legacy = context.files.iter().any(|f| f.is_under(&m.legacy_router));
        if uses_primary && uses_legacy {
            issues.push(
                Issue::error(
                    "duplicate-router",
                    Category::Structure,
                    format!(
                        "Both '{}/' and legacy '{}/' routers are in use",
                        m.primary_router, m.legacy_router
                    ),
                )
                .with_suggestion(format!(
                    "Migrate the '{}/' routes into '{}/'",
                    m.legacy_router, m.primary_router
                )),
            );
        }

        if !context.files.is_empty() {
            for required in &m.required {
                if !context.files.iter().any(|f| f.is_under(required)) {
                    issues.push(
                        Issue::warning(
                            "missing-required-directory",
                            Category::Structure,
                            format!("No file of the change lives under required directory '{}'", required),
                        )
                        .with_suggestion(format!("Place the module entry points under '{}/'", required)),
                    );
                }
            }
        }
    }

    fn check_source_file(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        let h = &self.heuristics;

        if h.untyped_source.matches(file) {
            issues.push(
                Issue::warning(
                    "untyped-source",
                    Category::Typing,
                    "Source file is not TypeScript",
                )
                .at_file(&file.path)
                .with_suggestion("Rename to .ts/.tsx and add types"),
            );
        }

        let any_count = h.explicit_any.count(file);
        if any_count > 0 {
            issues.push(
                Issue::warning(
                    "explicit-any",
                    Category::Typing,
                    format!("{} use(s) of the `any` type", any_count),
                )
                .at_file(&file.path)
                .with_suggestion("Replace `any` with a concrete type or `unknown`"),
            );
        }

        if h.parent_relative_import.matches(file) {
            issues.push(
                Issue::info(
                    "relative-import",
                    Category::Conventions,
                    "Parent-relative import instead of the @/ alias",
                )
                .at_file(&file.path)
                .with_suggestion("Import through the @/ path alias")
                .auto_fixable(),
            );
        }

        if h.debug_statement.matches(file) {
            issues.push(
                Issue::warning(
                    "debug-statement",
                    Category::Conventions,
                    format!("{} debug statement(s) left in code", h.debug_statement.count(file)),
                )
                .at_file(&file.path)
                .with_suggestion("Remove console.log/debugger or use the logger")
                .auto_fixable(),
            );
        }

        if file.has_content() {
            self.check_exports(file, issues);
        }

        if h.imports_after_code.matches(file) {
            issues.push(
                Issue::info(
                    "non-conventional-structure",
                    Category::Conventions,
                    "Imports appear after other top-level statements",
                )
                .at_file(&file.path)
                .with_suggestion("Keep directives first, then imports, then code"),
            );
        }

        if h.oversized.matches(file) {
            issues.push(
                Issue::info(
                    "oversized-file",
                    Category::Conventions,
                    format!("File is longer than {} lines", MAX_FILE_LINES),
                )
                .at_file(&file.path)
                .with_suggestion("Split the file into smaller modules"),
            );
        }
    }

    fn check_exports(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        let h = &self.heuristics;
        match file.kind {
            FileKind::Page if !h.default_export.matches(file) => issues.push(
                Issue::warning(
                    "missing-default-export",
                    Category::Conventions,
                    "Page does not default-export its component",
                )
                .at_file(&file.path)
                .with_suggestion("export default function Page() { ... }"),
            ),
            FileKind::Api if !h.route_handler_export.matches(file) => issues.push(
                Issue::warning(
                    "missing-route-handler",
                    Category::Conventions,
                    "API file exports no HTTP method handler",
                )
                .at_file(&file.path)
                .with_suggestion("export async function GET/POST(...) from the route file"),
            ),
            FileKind::Component | FileKind::Hook | FileKind::Util if !h.named_export.matches(file) => {
                issues.push(
                    Issue::info(
                        "missing-named-export",
                        Category::Conventions,
                        format!("{} file has no named export", file.kind),
                    )
                    .at_file(&file.path)
                    .with_suggestion("Prefer named exports for shared modules"),
                )
            }
            _ => {}
        }
    }

    fn check_api_file(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        if !file.has_content() {
            return;
        }
        let h = &self.heuristics;

        if !h.schema_validation.matches(file) {
            issues.push(
                Issue::error(
                    "missing-input-validation",
                    Category::Security,
                    "API handler does not validate its input with a schema",
                )
                .at_file(&file.path)
                .with_suggestion("Parse the request body with a zod schema"),
            );
        }

        if !h.auth_check.matches(file) {
            issues.push(
                Issue::error(
                    "missing-auth-check",
                    Category::Security,
                    "API handler does not check authentication",
                )
                .at_file(&file.path)
                .with_suggestion("Resolve the user with auth.getUser() and reject anonymous calls"),
            );
        }

        if h.db_query.matches(file) && !h.tenant_filter.matches(file) {
            issues.push(
                Issue::error(
                    "missing-tenant-isolation",
                    Category::Security,
                    "Database queries are not scoped to the caller's tenant",
                )
                .at_file(&file.path)
                .with_suggestion("Filter every query by tenant_id and rely on row-level security"),
            );
        }

        if !h.rate_limit.matches(file) {
            issues.push(
                Issue::warning(
                    "missing-rate-limit",
                    Category::Security,
                    "API handler has no rate limiting",
                )
                .at_file(&file.path)
                .with_suggestion("Wrap the handler with the shared rate limiter"),
            );
        }

        if !h.error_handling.matches(file) || h.empty_catch.matches(file) {
            issues.push(
                Issue::warning(
                    "weak-error-handling",
                    Category::Security,
                    "API handler has missing or empty error handling",
                )
                .at_file(&file.path)
                .with_suggestion("Catch failures and answer with a typed error response"),
            );
        }

        if h.sensitive_logging.matches(file) {
            issues.push(
                Issue::error(
                    "sensitive-logging",
                    Category::Security,
                    "Sensitive values are written to the log",
                )
                .at_file(&file.path)
                .with_suggestion("Never log credentials, tokens or cookies"),
            );
        }
    }

    fn check_ui_file(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        let h = &self.heuristics;
        let is_client = h.client_directive.matches(file);

        if is_client && !h.interactivity.matches(file) {
            issues.push(
                Issue::warning(
                    "unnecessary-client-directive",
                    Category::Performance,
                    "'use client' without any interactivity",
                )
                .at_file(&file.path)
                .with_suggestion("Drop the directive and keep this a server component")
                .auto_fixable(),
            );
        }

        if h.misplaced_directive.matches(file) {
            issues.push(
                Issue::warning(
                    "misplaced-client-directive",
                    Category::Conventions,
                    "'use client' is not the first statement of the file",
                )
                .at_file(&file.path)
                .with_suggestion("Move the directive to the top of the file")
                .auto_fixable(),
            );
        }

        let fetches_on_client = is_client || file.kind == FileKind::Hook;
        if fetches_on_client && h.raw_fetch.matches(file) && !h.query_cache.matches(file) {
            issues.push(
                Issue::warning(
                    "missing-query-cache",
                    Category::Performance,
                    "Client-side data fetching without the query cache",
                )
                .at_file(&file.path)
                .with_suggestion("Fetch through useQuery so results are cached and deduplicated"),
            );
        }

        if file.kind == FileKind::Hook && !is_hook_name(file.stem()) {
            issues.push(
                Issue::warning(
                    "hook-naming",
                    Category::Conventions,
                    format!("Hook file '{}' does not follow the useSomething convention", file.file_name()),
                )
                .at_file(&file.path)
                .with_suggestion("Name hook files and functions useSomething"),
            );
        }
    }

    fn check_route(&self, route: &RouteDescriptor, issues: &mut Vec<Issue>) {
        let label = route.label();
        match route.kind {
            RouteKind::Api => {
                if !route.has_auth {
                    issues.push(
                        Issue::error(
                            "route-missing-auth",
                            Category::Security,
                            format!("Route {} does not require authentication", label),
                        )
                        .with_suggestion("Require an authenticated session for this route"),
                    );
                }
                if !route.has_row_isolation {
                    issues.push(
                        Issue::error(
                            "route-missing-isolation",
                            Category::Security,
                            format!("Route {} is not isolated per tenant", label),
                        )
                        .with_suggestion("Enable row-level security and filter by tenant"),
                    );
                }
                if !route.has_validation {
                    let issue = if route.method.is_mutating() {
                        Issue::error(
                            "route-missing-validation",
                            Category::Security,
                            format!("Route {} accepts unvalidated input", label),
                        )
                    } else {
                        Issue::warning(
                            "route-missing-validation",
                            Category::Security,
                            format!("Route {} does not validate its parameters", label),
                        )
                    };
                    issues.push(issue.with_suggestion("Validate params and body with a schema"));
                }
                if !route.has_rate_limit {
                    issues.push(
                        Issue::warning(
                            "route-missing-rate-limit",
                            Category::Security,
                            format!("Route {} has no rate limit", label),
                        )
                        .with_suggestion("Apply the shared rate limiter"),
                    );
                }
            }
            RouteKind::Page => {
                if !route.has_auth {
                    issues.push(
                        Issue::warning(
                            "route-missing-auth",
                            Category::Security,
                            format!("Page {} is reachable without authentication", route.path),
                        )
                        .with_suggestion("Guard the page in middleware or the layout"),
                    );
                }
            }
        }
    }
}

fn recommendation(issue_type: &str) -> Option<&'static str> {
    Some(match issue_type {
        "forbidden-directory" | "unexpected-directory" | "missing-required-directory" => {
            "Keep files inside the approved directory layout"
        }
        "duplicate-router" => "Finish the router migration so only one routing paradigm remains",
        "untyped-source" | "explicit-any" => "Tighten typing: TypeScript everywhere, no `any`",
        "relative-import" | "debug-statement" | "non-conventional-structure" | "oversized-file" => {
            "Run the linter and formatter before submitting"
        }
        "missing-default-export" | "missing-route-handler" | "missing-named-export" => {
            "Follow the export convention for each file type"
        }
        "missing-input-validation" | "route-missing-validation" => "Validate every API input with a schema",
        "missing-auth-check" | "route-missing-auth" => "Authenticate every protected route and handler",
        "missing-tenant-isolation" | "route-missing-isolation" => "Scope all data access to the caller's tenant",
        "missing-rate-limit" | "route-missing-rate-limit" => "Rate limit public API surfaces",
        "weak-error-handling" => "Handle API failures explicitly",
        "sensitive-logging" => "Scrub secrets from log statements",
        "unnecessary-client-directive" | "misplaced-client-directive" => {
            "Reserve 'use client' for interactive components"
        }
        "missing-query-cache" => "Use the query cache for client-side fetching",
        "hook-naming" => "Name hooks useSomething",
        _ => return None,
    })
}

impl Check for StructuralCheck {
    fn name(&self) -> &str {
        STRUCTURAL_CHECK
    }

    fn family(&self) -> CheckFamily {
        CheckFamily::Structural
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn run(&self, context: &PolicyContext) -> RuleResult<CheckResult> {
        let mut issues = Vec::new();

        self.check_directories(context, &mut issues);

        for file in &context.files {
            if file.kind.is_source() {
                self.check_source_file(file, &mut issues);
            }
            match file.kind {
                FileKind::Api => self.check_api_file(file, &mut issues),
                FileKind::Component | FileKind::Page | FileKind::Hook => self.check_ui_file(file, &mut issues),
                _ => {}
            }
        }

        for route in &context.routes {
            self.check_route(route, &mut issues);
        }

        debug!("{}: {} issue(s) for module {}", STRUCTURAL_CHECK, issues.len(), context.module);
        let recommendations = recommend(&issues, recommendation);
        Ok(CheckResult::from_issues(STRUCTURAL_CHECK, issues, self.threshold, recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HttpMethod;
    use crate::issue::Severity;

    const SECURE_ROUTE: &str = r#"
import { z } from "zod";
import { NextResponse } from "next/server";
import { createClient } from "@/lib/supabase/server";
import { rateLimit } from "@/lib/rate-limit";

const OrderQuery = z.object({ status: z.string().optional() });

export async function GET(request: Request) {
  try {
    await rateLimit(request);
    const supabase = createClient();
    const { data: { user } } = await supabase.auth.getUser();
    if (!user) {
      return NextResponse.json({ error: "Unauthorized" }, { status: 401 });
    }
    const query = OrderQuery.parse(Object.fromEntries(new URL(request.url).searchParams));
    const { data } = await supabase
      .from("orders")
      .select("*")
      .eq("tenant_id", user.app_metadata.tenant_id)
      .eq("status", query.status);
    return NextResponse.json({ data });
  } catch (err) {
    return NextResponse.json({ error: "Failed to load orders" }, { status: 500 });
  }
}
"#;

    fn check() -> StructuralCheck {
        StructuralCheck::new(DirectoryManifest::default()).unwrap()
    }

    fn types(result: &CheckResult) -> Vec<&str> {
        result.issues.iter().map(|i| i.issue_type.as_str()).collect()
    }

    #[test]
    fn test_protected_route_with_secure_handler_has_no_errors() {
        let ctx = PolicyContext::new("orders")
            .with_file(FileDescriptor::new("app/api/orders/route.ts", FileKind::Api).with_content(SECURE_ROUTE))
            .with_route(RouteDescriptor::api("/api/orders", HttpMethod::Get).fully_protected());
        let result = check().run(&ctx).unwrap();

        assert_eq!(result.count(Severity::Error), 0, "errors: {:?}", types(&result));
        assert!(result.issues.is_empty(), "issues: {:?}", types(&result));
        assert!(result.passed);
    }

    #[test]
    fn test_unprotected_api_handler() {
        let content = r#"
export async function POST(request: Request) {
  const body: any = await request.json();
  console.log("token", body.token);
  const { data } = await supabase.from("orders").insert(body);
  return Response.json(data);
}
"#;
        let ctx = PolicyContext::new("orders")
            .with_file(FileDescriptor::new("app/api/orders/route.ts", FileKind::Api).with_content(content));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        for expected in [
            "missing-input-validation",
            "missing-auth-check",
            "missing-tenant-isolation",
            "missing-rate-limit",
            "weak-error-handling",
            "sensitive-logging",
            "explicit-any",
            "debug-statement",
        ] {
            assert!(t.contains(&expected), "missing {} in {:?}", expected, t);
        }
        assert_eq!(result.score, 0);
        assert!(!result.passed);
    }

    #[test]
    fn test_route_descriptor_validation_emits_one_issue_per_gap() {
        let ctx = PolicyContext::new("orders")
            .with_route(RouteDescriptor::api("/api/orders", HttpMethod::Post))
            .with_route(RouteDescriptor::api("/api/orders", HttpMethod::Get).with_auth(true).with_row_isolation(true));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        assert_eq!(t.iter().filter(|t| **t == "route-missing-auth").count(), 1);
        assert_eq!(t.iter().filter(|t| **t == "route-missing-isolation").count(), 1);
        assert_eq!(t.iter().filter(|t| **t == "route-missing-validation").count(), 2);
        assert_eq!(t.iter().filter(|t| **t == "route-missing-rate-limit").count(), 2);

        let get_validation = result
            .issues
            .iter()
            .find(|i| i.issue_type == "route-missing-validation" && i.message.contains("GET"))
            .unwrap();
        assert_eq!(get_validation.severity, Severity::Warning);
    }

    #[test]
    fn test_page_route_only_checks_auth() {
        let ctx = PolicyContext::new("x").with_route(RouteDescriptor::page("/dashboard"));
        let result = check().run(&ctx).unwrap();

        assert_eq!(types(&result), vec!["route-missing-auth"]);
        assert_eq!(result.issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_directory_rules() {
        let ctx = PolicyContext::new("x")
            .with_file(FileDescriptor::new("app/orders/page.tsx", FileKind::Page))
            .with_file(FileDescriptor::new("pages/orders.tsx", FileKind::Page))
            .with_file(FileDescriptor::new("legacy/helpers.ts", FileKind::Util))
            .with_file(FileDescriptor::new("scratch/notes.ts", FileKind::Util));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        assert!(t.contains(&"duplicate-router"));
        assert!(t.contains(&"forbidden-directory"));
        assert!(t.contains(&"unexpected-directory"));
    }

    #[test]
    fn test_required_directories() {
        let manifest = DirectoryManifest {
            required: vec!["app".to_string()],
            ..DirectoryManifest::default()
        };
        let check = StructuralCheck::new(manifest).unwrap();

        let ctx = PolicyContext::new("x").with_file(FileDescriptor::new("lib/a.ts", FileKind::Util));
        assert!(types(&check.run(&ctx).unwrap()).contains(&"missing-required-directory"));

        // Nothing to place, nothing to require.
        let empty = PolicyContext::new("x");
        assert!(check.run(&empty).unwrap().issues.is_empty());
    }

    #[test]
    fn test_source_conventions() {
        let content = r#"
import { format } from "../../lib/format";
const rate = 2;
import { other } from "@/lib/other";
export function total(x) { debugger; return x * rate; }
"#;
        let ctx = PolicyContext::new("x")
            .with_file(FileDescriptor::new("lib/total.js", FileKind::Util).with_content(content));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        assert!(t.contains(&"untyped-source"));
        assert!(t.contains(&"relative-import"));
        assert!(t.contains(&"debug-statement"));
        assert!(t.contains(&"non-conventional-structure"));
        assert!(!t.contains(&"missing-named-export"));
    }

    #[test]
    fn test_export_conventions() {
        let page = FileDescriptor::new("app/orders/page.tsx", FileKind::Page)
            .with_content("export function OrdersPage() { return <main />; }");
        let api = FileDescriptor::new("app/api/ping/route.ts", FileKind::Api)
            .with_content("const handler = () => null;");
        let ctx = PolicyContext::new("x").with_file(page).with_file(api);
        let t_result = check().run(&ctx).unwrap();
        let t = types(&t_result);

        assert!(t.contains(&"missing-default-export"));
        assert!(t.contains(&"missing-route-handler"));
    }

    #[test]
    fn test_client_directive_rules() {
        let static_client = FileDescriptor::new("components/Title.tsx", FileKind::Component)
            .with_content("\"use client\";\nexport function Title() { return <h1>Orders</h1>; }");
        let misplaced = FileDescriptor::new("components/Toggle.tsx", FileKind::Component).with_content(
            "import { useState } from \"react\";\n'use client';\nexport function Toggle() { const [on, setOn] = useState(false); return <button onClick={() => setOn(!on)} />; }",
        );
        let ctx = PolicyContext::new("x").with_file(static_client).with_file(misplaced);
        let result = check().run(&ctx).unwrap();

        let unnecessary: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.issue_type == "unnecessary-client-directive")
            .collect();
        assert_eq!(unnecessary.len(), 1);
        assert_eq!(unnecessary[0].file.as_deref(), Some("components/Title.tsx"));
        assert!(types(&result).contains(&"misplaced-client-directive"));
    }

    #[test]
    fn test_hook_rules() {
        let hook = FileDescriptor::new("hooks/orders.ts", FileKind::Hook).with_content(
            "export function orders() { const [d, setD] = useState([]); useEffect(() => { fetch(\"/api/orders\").then(r => r.json()).then(setD); }, []); return d; }",
        );
        let result = check().run(&PolicyContext::new("x").with_file(hook)).unwrap();
        let t = types(&result);

        assert!(t.contains(&"hook-naming"));
        assert!(t.contains(&"missing-query-cache"));
    }

    #[test]
    fn test_simulated_files_only_get_path_findings() {
        let ctx = PolicyContext::new("ci")
            .with_file(FileDescriptor::new("app/api/orders/route.js", FileKind::Api));
        let result = check().run(&ctx).unwrap();

        assert_eq!(types(&result), vec!["untyped-source"]);
    }
}
