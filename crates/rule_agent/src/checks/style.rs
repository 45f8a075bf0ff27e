//! Style and branding compliance.
//!
//! Looks at component, page and style-sheet files for design-system drift:
//! inline styles, literal colours, off-scale spacing, missing motion,
//! accessibility gaps and missing UI states.

use std::collections::BTreeSet;

use tracing::debug;

use crate::checks::{recommend, Check, CheckFamily, STYLE_CHECK};
use crate::context::{FileDescriptor, FileKind, PolicyContext};
use crate::error::RuleResult;
use crate::fixtures::StyleTokens;
use crate::heuristics::{Heuristic, PatternHeuristic, TokenHeuristic};
use crate::issue::{Category, CheckResult, Issue};

/// Default pass threshold.
pub const STYLE_THRESHOLD: u32 = 80;

/// Named predicates used by the style check.
#[derive(Debug, Clone)]
pub struct StyleHeuristics {
    pub inline_style: PatternHeuristic,
    pub literal_color: PatternHeuristic,
    pub arbitrary_spacing: PatternHeuristic,
    pub arbitrary_radius: PatternHeuristic,
    pub spacing_step: PatternHeuristic,
    pub radius_step: PatternHeuristic,
    pub interactive: PatternHeuristic,
    pub motion: TokenHeuristic,
    pub image_tag: PatternHeuristic,
    pub form_field: PatternHeuristic,
    pub label: PatternHeuristic,
    pub clickable_non_semantic: PatternHeuristic,
    pub keyboard_handler: PatternHeuristic,
    pub landmark: PatternHeuristic,
    pub async_work: PatternHeuristic,
    pub loading_state: PatternHeuristic,
    pub error_state: PatternHeuristic,
    pub list_render: PatternHeuristic,
    pub empty_state: PatternHeuristic,
    pub theme_variable: PatternHeuristic,
    pub dark_mode: PatternHeuristic,
    pub shared_layout: TokenHeuristic,
    pub theme_switching: TokenHeuristic,
}

impl StyleHeuristics {
    pub fn compile(tokens: &StyleTokens) -> RuleResult<Self> {
        Ok(Self {
            inline_style: PatternHeuristic::new("inline-style", r"style=\{\{")?,
            literal_color: PatternHeuristic::new(
                "literal-color",
                r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})\b|rgba?\(\s*\d",
            )?,
            arbitrary_spacing: PatternHeuristic::new(
                "arbitrary-spacing",
                r"\b(?:p|m)[trblxy]?-\[[^\]]+\]|\bgap(?:-[xy])?-\[[^\]]+\]|\bspace-[xy]-\[[^\]]+\]",
            )?,
            arbitrary_radius: PatternHeuristic::new(
                "arbitrary-radius",
                r"\brounded(?:-[trbl]{1,2})?-\[[^\]]+\]",
            )?,
            spacing_step: PatternHeuristic::new(
                "spacing-step",
                r"\b((?:(?:p|m)[trblxy]?|gap(?:-[xy])?|space-[xy])-(\d+(?:\.\d+)?))\b",
            )?,
            radius_step: PatternHeuristic::new(
                "radius-step",
                r"\b(rounded-(?:[trbl]{1,2}-)?([a-z0-9]+))\b",
            )?,
            interactive: PatternHeuristic::new(
                "interactive-element",
                r"onClick=|<button\b|<Button\b|<Link\b",
            )?,
            motion: TokenHeuristic::new("motion", tokens.motion_markers.iter().cloned()),
            image_tag: PatternHeuristic::new("image-tag", r"<(?:img|Image)\b[^>]*>")?,
            form_field: PatternHeuristic::new("form-field", r"<(?:input|select|textarea)\b")?,
            label: PatternHeuristic::new(
                "form-label",
                r"<label\b|<Label\b|aria-label=|aria-labelledby=|htmlFor=",
            )?,
            clickable_non_semantic: PatternHeuristic::new(
                "clickable-non-semantic",
                r"<(?:div|span)\b[^>]*\bonClick=",
            )?,
            keyboard_handler: PatternHeuristic::new(
                "keyboard-handler",
                r"onKey(?:Down|Up|Press)=",
            )?,
            landmark: PatternHeuristic::new(
                "semantic-landmark",
                r"<(?:main|nav|header|footer|section|article|aside)\b",
            )?,
            async_work: PatternHeuristic::new(
                "async-work",
                r"\buse(?:Query|SWR|InfiniteQuery|SuspenseQuery)\b|\bfetch\(|\bawait\s",
            )?,
            loading_state: PatternHeuristic::new(
                "loading-state",
                r"isLoading|isPending|isFetching|loading|Loading|Skeleton|Spinner|Suspense",
            )?,
            error_state: PatternHeuristic::new(
                "error-state",
                r"isError|\berror\b|ErrorBoundary|ErrorState|\bcatch\b",
            )?,
            list_render: PatternHeuristic::new("list-render", r"\.map\(\s*\(?\s*\w+")?,
            empty_state: PatternHeuristic::new(
                "empty-state",
                r"EmptyState|\.length\s*===?\s*0|!\s*\w+(?:\?)?\.length|\.length\s*<\s*1|(?i:no \w+ (?:found|yet))",
            )?,
            theme_variable: PatternHeuristic::new("theme-variable", r"var\(--[\w-]+\)")?,
            dark_mode: PatternHeuristic::new(
                "dark-mode-selector",
                r"\.dark\b|\[data-theme=|prefers-color-scheme:\s*dark",
            )?,
            shared_layout: TokenHeuristic::new("shared-layout", tokens.layout_components.iter().cloned()),
            theme_switching: TokenHeuristic::new("theme-switching", tokens.theme_markers.iter().cloned()),
        })
    }

    /// Spacing utilities off the scale, including arbitrary `[..]` values.
    /// An empty scale only rejects arbitrary values.
    pub fn off_scale_spacing(&self, file: &FileDescriptor, scale: &[String]) -> Vec<String> {
        let mut values: BTreeSet<String> = self
            .arbitrary_spacing
            .find_all(file)
            .into_iter()
            .map(str::to_string)
            .collect();
        values.extend(off_scale_steps(&self.spacing_step, file, scale, |_| false));
        values.into_iter().collect()
    }

    /// Radius utilities off the scale, including arbitrary `[..]` values.
    pub fn off_scale_radius(&self, file: &FileDescriptor, scale: &[String]) -> Vec<String> {
        let mut values: BTreeSet<String> = self
            .arbitrary_radius
            .find_all(file)
            .into_iter()
            .map(str::to_string)
            .collect();
        // `rounded-t` is a side with the default radius, not a step
        let is_side = |step: &str| matches!(step, "t" | "r" | "b" | "l" | "tl" | "tr" | "bl" | "br" | "s" | "e");
        values.extend(off_scale_steps(&self.radius_step, file, scale, is_side));
        values.into_iter().collect()
    }

    /// `<img>`/`<Image>` tags without an `alt` attribute.
    pub fn images_without_alt(&self, file: &FileDescriptor) -> usize {
        self.image_tag
            .find_all(file)
            .into_iter()
            .filter(|tag| !tag.contains("alt="))
            .count()
    }
}

/// Whole utilities (group 1) whose step (group 2) is not in `scale`.
fn off_scale_steps(
    pattern: &PatternHeuristic,
    file: &FileDescriptor,
    scale: &[String],
    skip: impl Fn(&str) -> bool,
) -> Vec<String> {
    if scale.is_empty() {
        return Vec::new();
    }
    pattern
        .captures(file)
        .into_iter()
        .filter_map(|groups| match groups.as_slice() {
            [Some(utility), Some(step)] if !skip(*step) && !scale.iter().any(|s| s.as_str() == *step) => {
                Some((*utility).to_string())
            }
            _ => None,
        })
        .collect()
}

/// Style and branding compliance check.
#[derive(Debug, Clone)]
pub struct StyleCheck {
    tokens: StyleTokens,
    heuristics: StyleHeuristics,
    threshold: u32,
}

impl StyleCheck {
    pub fn new(tokens: StyleTokens) -> RuleResult<Self> {
        let heuristics = StyleHeuristics::compile(&tokens)?;
        Ok(Self {
            tokens,
            heuristics,
            threshold: STYLE_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn heuristics(&self) -> &StyleHeuristics {
        &self.heuristics
    }

    fn check_ui_file(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        let h = &self.heuristics;

        if h.inline_style.matches(file) {
            issues.push(
                Issue::error(
                    "inline-style",
                    Category::Branding,
                    "Inline style object used instead of design tokens",
                )
                .at_file(&file.path)
                .with_suggestion("Move the styles to utility classes or theme tokens"),
            );
        }

        let colors: BTreeSet<String> = h
            .literal_color
            .find_all(file)
            .into_iter()
            .filter(|c| c.starts_with('#'))
            .map(str::to_ascii_lowercase)
            .collect();
        let rgb_literals = h.literal_color.find_all(file).iter().filter(|c| c.starts_with("rgb")).count();
        if !colors.is_empty() || rgb_literals > 0 {
            let mut issue = Issue::error(
                "hardcoded-color",
                Category::Branding,
                format!(
                    "{} literal colour value(s) instead of theme variables",
                    colors.len() + rgb_literals
                ),
            )
            .at_file(&file.path);

            let mapped: Vec<String> = colors
                .iter()
                .filter_map(|c| self.tokens.token_for_color(c).map(|t| format!("{} -> var(--color-{})", c, t)))
                .collect();
            issue = if mapped.is_empty() {
                issue.with_suggestion("Use a theme variable such as var(--color-primary)")
            } else {
                issue
                    .with_suggestion(format!("Replace with theme variables: {}", mapped.join(", ")))
                    .auto_fixable()
            };
            issues.push(issue);
        }

        let spacing = h.off_scale_spacing(file, &self.tokens.spacing_scale);
        if !spacing.is_empty() {
            issues.push(
                Issue::warning(
                    "non-standard-spacing",
                    Category::Layout,
                    format!("Spacing values outside the scale: {}", spacing.join(", ")),
                )
                .at_file(&file.path)
                .with_suggestion(format!(
                    "Use spacing steps from the scale ({})",
                    self.tokens.spacing_scale.join(", ")
                )),
            );
        }

        let radius = h.off_scale_radius(file, &self.tokens.radius_scale);
        if !radius.is_empty() {
            issues.push(
                Issue::warning(
                    "non-standard-radius",
                    Category::Layout,
                    format!("Border radius outside the radius scale: {}", radius.join(", ")),
                )
                .at_file(&file.path)
                .with_suggestion(format!(
                    "Use rounded-{{{}}}",
                    self.tokens.radius_scale.join("|")
                )),
            );
        }

        if h.interactive.matches(file) && !h.motion.matches(file) {
            issues.push(
                Issue::info(
                    "missing-motion",
                    Category::Motion,
                    "Interactive elements without any transition or animation",
                )
                .at_file(&file.path)
                .with_suggestion("Add a transition utility to hover and press states"),
            );
        }

        self.check_accessibility(file, issues);
        self.check_ui_states(file, issues);
    }

    fn check_accessibility(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        let h = &self.heuristics;

        let missing_alt = h.images_without_alt(file);
        if missing_alt > 0 {
            issues.push(
                Issue::error(
                    "missing-alt-text",
                    Category::Accessibility,
                    format!("{} image(s) without alt text", missing_alt),
                )
                .at_file(&file.path)
                .with_suggestion("Describe every image with alt, or alt=\"\" when decorative"),
            );
        }

        if h.form_field.matches(file) && !h.label.matches(file) {
            issues.push(
                Issue::warning(
                    "missing-form-label",
                    Category::Accessibility,
                    "Form fields without an associated label",
                )
                .at_file(&file.path)
                .with_suggestion("Pair each field with <label htmlFor> or aria-label"),
            );
        }

        if h.clickable_non_semantic.matches(file) && !h.keyboard_handler.matches(file) {
            issues.push(
                Issue::warning(
                    "missing-keyboard-handler",
                    Category::Accessibility,
                    "Click handler on a non-interactive element without keyboard support",
                )
                .at_file(&file.path)
                .with_suggestion("Use a <button> or add role, tabIndex and onKeyDown"),
            );
        }

        if file.kind == FileKind::Page && file.has_content() && !h.landmark.matches(file) {
            issues.push(
                Issue::info(
                    "missing-semantic-landmarks",
                    Category::Accessibility,
                    "Page renders no semantic landmark elements",
                )
                .at_file(&file.path)
                .with_suggestion("Wrap the page body in <main> and use <header>/<nav>/<section>"),
            );
        }
    }

    fn check_ui_states(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        let h = &self.heuristics;

        if h.async_work.matches(file) {
            if !h.loading_state.matches(file) {
                issues.push(
                    Issue::warning(
                        "missing-loading-state",
                        Category::UxStates,
                        "Async data without a loading state",
                    )
                    .at_file(&file.path)
                    .with_suggestion("Render a Skeleton while data is pending"),
                );
            }
            if !h.error_state.matches(file) {
                issues.push(
                    Issue::warning(
                        "missing-error-state",
                        Category::UxStates,
                        "Async data without an error state",
                    )
                    .at_file(&file.path)
                    .with_suggestion("Handle the error branch with a visible message"),
                );
            }
        }

        if h.list_render.matches(file) && !h.empty_state.matches(file) {
            issues.push(
                Issue::info(
                    "missing-empty-state",
                    Category::UxStates,
                    "List rendering without an empty state",
                )
                .at_file(&file.path)
                .with_suggestion("Render an EmptyState when the list has no items"),
            );
        }
    }

    fn check_style_file(&self, file: &FileDescriptor, issues: &mut Vec<Issue>) {
        if !file.has_content() {
            return;
        }
        let h = &self.heuristics;

        if !h.theme_variable.matches(file) {
            issues.push(
                Issue::warning(
                    "missing-theme-variables",
                    Category::Theming,
                    "Stylesheet does not use any theme variable",
                )
                .at_file(&file.path)
                .with_suggestion("Reference colours and spacing through var(--token)"),
            );
        }
        if !h.dark_mode.matches(file) {
            issues.push(
                Issue::warning(
                    "missing-dark-mode",
                    Category::Theming,
                    "Stylesheet has no dark mode selector",
                )
                .at_file(&file.path)
                .with_suggestion("Add .dark overrides for the theme variables"),
            );
        }
    }

    fn check_module(&self, context: &PolicyContext, issues: &mut Vec<Issue>) {
        let ui_files: Vec<&FileDescriptor> = context.ui_files().filter(|f| f.has_content()).collect();
        if ui_files.is_empty() {
            return;
        }
        let h = &self.heuristics;

        if !ui_files.iter().any(|f| h.shared_layout.matches(f)) {
            issues.push(
                Issue::warning(
                    "missing-shared-layout",
                    Category::Layout,
                    format!("Module '{}' does not use any shared layout component", context.module),
                )
                .with_suggestion(format!(
                    "Render pages inside one of: {}",
                    self.tokens.layout_components.join(", ")
                )),
            );
        }

        if !ui_files.iter().any(|f| h.theme_switching.matches(f)) {
            issues.push(
                Issue::info(
                    "missing-theme-support",
                    Category::Theming,
                    format!("Module '{}' has no theme switching code", context.module),
                )
                .with_suggestion("Read the active theme with useTheme()"),
            );
        }
    }
}

fn recommendation(issue_type: &str) -> Option<&'static str> {
    Some(match issue_type {
        "inline-style" | "hardcoded-color" => "Route every colour and style through the design tokens",
        "non-standard-spacing" | "non-standard-radius" => "Stick to the spacing and radius scales",
        "missing-motion" => "Give interactive elements consistent transitions",
        "missing-alt-text" | "missing-form-label" | "missing-keyboard-handler" | "missing-semantic-landmarks" => {
            "Review the components against the accessibility checklist"
        }
        "missing-loading-state" | "missing-error-state" | "missing-empty-state" => {
            "Cover loading, empty and error states for data-driven UI"
        }
        "missing-theme-variables" | "missing-dark-mode" | "missing-theme-support" => {
            "Support both themes through theme variables"
        }
        "missing-shared-layout" => "Build pages on the shared layout components",
        _ => return None,
    })
}

impl Check for StyleCheck {
    fn name(&self) -> &str {
        STYLE_CHECK
    }

    fn family(&self) -> CheckFamily {
        CheckFamily::Style
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn run(&self, context: &PolicyContext) -> RuleResult<CheckResult> {
        let mut issues = Vec::new();

        for file in &context.files {
            match file.kind {
                FileKind::Component | FileKind::Page => self.check_ui_file(file, &mut issues),
                FileKind::Style => self.check_style_file(file, &mut issues),
                _ => {}
            }
        }
        self.check_module(context, &mut issues);

        debug!("{}: {} issue(s) for module {}", STYLE_CHECK, issues.len(), context.module);
        let recommendations = recommend(&issues, recommendation);
        Ok(CheckResult::from_issues(STYLE_CHECK, issues, self.threshold, recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    const CLEAN_COMPONENT: &str = r#"
import { Button } from "@/components/ui/button";
import { DashboardLayout } from "@/components/layout";
import { useTheme } from "next-themes";

export function OrderActions({ onConfirm }: Props) {
  const { theme } = useTheme();
  return (
    <DashboardLayout>
      <div className="p-4 rounded-lg">
        <Button className="transition-colors" onClick={onConfirm}>Confirm</Button>
      </div>
    </DashboardLayout>
  );
}
"#;

    fn check() -> StyleCheck {
        StyleCheck::new(StyleTokens::default()).unwrap()
    }

    fn component(path: &str, content: &str) -> FileDescriptor {
        FileDescriptor::new(path, FileKind::Component).with_content(content)
    }

    fn types(result: &CheckResult) -> Vec<&str> {
        result.issues.iter().map(|i| i.issue_type.as_str()).collect()
    }

    #[test]
    fn test_clean_component_has_no_issues() {
        let ctx = PolicyContext::new("orders").with_file(component("components/OrderActions.tsx", CLEAN_COMPONENT));
        let result = check().run(&ctx).unwrap();

        assert!(result.issues.is_empty(), "unexpected issues: {:?}", types(&result));
        assert_eq!(result.score, 100);
        assert!(result.passed);
    }

    #[test]
    fn test_inline_style_and_hex_color_fail() {
        let content = r##"export const Banner = () => <div style={{ color: "#ff0000" }}>Hi</div>;"##;
        let ctx = PolicyContext::new("marketing").with_file(component("components/Banner.tsx", content));
        let result = check().run(&ctx).unwrap();

        assert!(result.count(Severity::Error) >= 1);
        assert!(result.score <= 80);
        assert!(!result.passed);
        let t = types(&result);
        assert!(t.contains(&"inline-style"));
        assert!(t.contains(&"hardcoded-color"));
    }

    #[test]
    fn test_brand_color_maps_to_token() {
        let content = r#"export const Tag = () => <span className="text-[#7C3AED]">New</span>;"#;
        let ctx = PolicyContext::new("x").with_file(component("components/Tag.tsx", content));
        let result = check().run(&ctx).unwrap();

        let issue = result.issues.iter().find(|i| i.issue_type == "hardcoded-color").unwrap();
        assert!(issue.auto_fixable);
        assert!(issue.suggestion.as_deref().unwrap().contains("var(--color-primary)"));
    }

    #[test]
    fn test_off_scale_spacing_and_radius() {
        let content = r#"export const Box = () => <div className="p-[13px] rounded-[7px]" />;"#;
        let ctx = PolicyContext::new("x").with_file(component("components/Box.tsx", content));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        assert!(t.contains(&"non-standard-spacing"));
        assert!(t.contains(&"non-standard-radius"));
    }

    #[test]
    fn test_utility_steps_follow_the_token_scale() {
        let content = r#"export const Box = () => <div className="p-5 m-7 gap-9 px-4 rounded-3xl rounded-t-lg rounded-b" />;"#;
        let ctx = PolicyContext::new("x").with_file(component("components/Box.tsx", content));
        let result = check().run(&ctx).unwrap();

        let spacing = result.issues.iter().find(|i| i.issue_type == "non-standard-spacing").unwrap();
        assert_eq!(spacing.message, "Spacing values outside the scale: gap-9, m-7, p-5");
        let radius = result.issues.iter().find(|i| i.issue_type == "non-standard-radius").unwrap();
        assert_eq!(radius.message, "Border radius outside the radius scale: rounded-3xl");

        let mut tokens = StyleTokens::default();
        tokens.spacing_scale.extend(["5".to_string(), "7".to_string(), "9".to_string()]);
        tokens.radius_scale.push("3xl".into());
        let result = StyleCheck::new(tokens).unwrap().run(&ctx).unwrap();
        let t = types(&result);
        assert!(!t.contains(&"non-standard-spacing"));
        assert!(!t.contains(&"non-standard-radius"));
    }

    #[test]
    fn test_accessibility_findings() {
        let content = r#"
export function Gallery() {
  return (
    <div onClick={open}>
      <img src="/a.png" />
      <img src="/b.png" alt="B" />
      <input name="q" />
    </div>
  );
}
"#;
        let ctx = PolicyContext::new("x").with_file(component("components/Gallery.tsx", content));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        assert!(t.contains(&"missing-alt-text"));
        assert!(t.contains(&"missing-form-label"));
        assert!(t.contains(&"missing-keyboard-handler"));
        let alt = result.issues.iter().find(|i| i.issue_type == "missing-alt-text").unwrap();
        assert!(alt.message.starts_with("1 image"));
    }

    #[test]
    fn test_async_list_without_states() {
        let content = r#"
export function Orders() {
  const { data } = useQuery({ queryKey: ["orders"], queryFn: getOrders });
  return <ul>{data.map((o) => <li key={o.id}>{o.name}</li>)}</ul>;
}
"#;
        let ctx = PolicyContext::new("x").with_file(component("components/Orders.tsx", content));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        assert!(t.contains(&"missing-loading-state"));
        assert!(t.contains(&"missing-error-state"));
        assert!(t.contains(&"missing-empty-state"));
    }

    #[test]
    fn test_stylesheet_rules() {
        let bare = FileDescriptor::new("styles/orders.css", FileKind::Style).with_content(".card { color: red; }");
        let themed = FileDescriptor::new("styles/globals.css", FileKind::Style)
            .with_content(":root { --bg: white; } .dark { --bg: black; } body { background: var(--bg); }");

        let result = check().run(&PolicyContext::new("x").with_file(bare)).unwrap();
        let t = types(&result);
        assert!(t.contains(&"missing-theme-variables"));
        assert!(t.contains(&"missing-dark-mode"));

        let result = check().run(&PolicyContext::new("x").with_file(themed)).unwrap();
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_module_level_findings() {
        let content = r#"export const Plain = () => <div className="p-4">plain</div>;"#;
        let ctx = PolicyContext::new("reports").with_file(component("components/Plain.tsx", content));
        let result = check().run(&ctx).unwrap();
        let t = types(&result);

        assert!(t.contains(&"missing-shared-layout"));
        assert!(t.contains(&"missing-theme-support"));
    }

    #[test]
    fn test_files_without_content_are_skipped() {
        let ctx = PolicyContext::new("ci")
            .with_file(FileDescriptor::new("components/Ghost.tsx", FileKind::Component))
            .with_file(FileDescriptor::new("styles/ghost.css", FileKind::Style));
        let result = check().run(&ctx).unwrap();

        assert!(result.issues.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_run_is_deterministic() {
        let content = r##"export const Banner = () => <div style={{ color: "#ff0000" }}>Hi</div>;"##;
        let ctx = PolicyContext::new("x").with_file(component("components/Banner.tsx", content));
        let c = check();
        assert_eq!(c.run(&ctx).unwrap(), c.run(&ctx).unwrap());
    }

    #[test]
    fn test_recommendations_are_deduplicated() {
        let content = r##"export const A = () => <div style={{ color: "#123456" }} />;"##;
        let ctx = PolicyContext::new("x")
            .with_file(component("components/A.tsx", content))
            .with_file(component("components/B.tsx", content));
        let result = check().run(&ctx).unwrap();

        let token_recs = result
            .recommendations
            .iter()
            .filter(|r| r.contains("design tokens"))
            .count();
        assert_eq!(token_recs, 1);
    }
}
