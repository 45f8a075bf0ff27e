//! Policy context model.
//!
//! A [`PolicyContext`] describes the change under evaluation: the module it
//! belongs to, the files and routes it touches, and the features it declares.
//! Checks only ever receive it by shared reference.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Version of the context layout produced by this crate.
pub const CONTEXT_SCHEMA_VERSION: &str = "1.0.0";

/// Kind of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Component,
    Page,
    Api,
    Hook,
    Util,
    Style,
    Config,
    Migration,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Component => "component",
            FileKind::Page => "page",
            FileKind::Api => "api",
            FileKind::Hook => "hook",
            FileKind::Util => "util",
            FileKind::Style => "style",
            FileKind::Config => "config",
            FileKind::Migration => "migration",
        }
    }

    /// Whether files of this kind render UI.
    pub fn is_ui(&self) -> bool {
        matches!(self, FileKind::Component | FileKind::Page)
    }

    /// Whether files of this kind hold executable source code.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            FileKind::Component | FileKind::Page | FileKind::Api | FileKind::Hook | FileKind::Util
        )
    }

    /// Infer the kind of a file from its path.
    ///
    /// Returns `None` for files the rule agent does not look at (images,
    /// lockfiles, markdown and so on).
    pub fn infer(path: &str) -> Option<Self> {
        let normalized = path.replace('\\', "/");
        let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match ext {
            "css" | "scss" | "sass" | "less" => return Some(FileKind::Style),
            "sql" => return Some(FileKind::Migration),
            "json" | "yaml" | "yml" | "toml" => return Some(FileKind::Config),
            "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => {}
            _ => return None,
        }

        let stem = file_name.split('.').next().unwrap_or("");
        if file_name.contains(".config.") || stem == "middleware" {
            return Some(FileKind::Config);
        }
        if normalized.contains("/migrations/") || normalized.starts_with("migrations/") {
            return Some(FileKind::Migration);
        }
        if normalized.starts_with("app/api/")
            || normalized.contains("/app/api/")
            || normalized.starts_with("pages/api/")
            || normalized.contains("/pages/api/")
            || stem == "route"
        {
            return Some(FileKind::Api);
        }
        if matches!(stem, "page" | "layout" | "loading" | "error" | "not-found" | "template") {
            return Some(FileKind::Page);
        }
        if normalized.starts_with("pages/") || normalized.contains("/pages/") {
            return Some(FileKind::Page);
        }
        if normalized.contains("/hooks/") || normalized.starts_with("hooks/") || is_hook_name(stem) {
            return Some(FileKind::Hook);
        }
        if matches!(ext, "tsx" | "jsx") {
            return Some(FileKind::Component);
        }
        Some(FileKind::Util)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "component" => Ok(FileKind::Component),
            "page" => Ok(FileKind::Page),
            "api" => Ok(FileKind::Api),
            "hook" => Ok(FileKind::Hook),
            "util" => Ok(FileKind::Util),
            "style" => Ok(FileKind::Style),
            "config" => Ok(FileKind::Config),
            "migration" => Ok(FileKind::Migration),
            other => Err(RuleError::InvalidConfiguration(format!(
                "unknown file kind '{}'",
                other
            ))),
        }
    }
}

/// `useSomething` naming convention for hooks.
pub(crate) fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// HTTP verb of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether the verb carries a request body that must be validated.
    pub fn is_mutating(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(RuleError::InvalidConfiguration(format!(
                "unknown HTTP method '{}'",
                other
            ))),
        }
    }
}

/// Kind of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Api,
    Page,
}

/// A source file taking part in the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path relative to the project root
    pub path: String,
    /// Kind of file
    pub kind: FileKind,
    /// Raw text; absent for CI-simulated entries
    #[serde(default)]
    pub content: Option<String>,
    /// Size in bytes, derived from the content
    #[serde(default)]
    pub size: usize,
    /// Declared package dependencies
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Imported module specifiers
    #[serde(default)]
    pub imports: Vec<String>,
    /// Exported names
    #[serde(default)]
    pub exports: Vec<String>,
}

impl FileDescriptor {
    /// Create a descriptor with no content.
    pub fn new(path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            path: path.into(),
            kind,
            content: None,
            size: 0,
            dependencies: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// Set the content; the size follows it.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        self.size = content.len();
        self.content = Some(content);
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Size for descriptors without content.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_imports(mut self, imports: Vec<String>) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_exports(mut self, exports: Vec<String>) -> Self {
        self.exports = exports;
        self
    }

    /// Content or the empty string.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// File name without directories.
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }

    /// File name up to the first dot.
    pub fn stem(&self) -> &str {
        self.file_name().split('.').next().unwrap_or("")
    }

    /// Lowercase extension, or the empty string.
    pub fn extension(&self) -> String {
        Path::new(self.file_name())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// First directory component of the path, if any.
    pub fn top_level_dir(&self) -> Option<&str> {
        let trimmed = self.path.trim_start_matches("./");
        let mut parts = trimmed.split(['/', '\\']);
        let first = parts.next()?;
        parts.next().map(|_| first)
    }

    /// Whether the path lies inside `dir` (a `/`-separated prefix).
    pub fn is_under(&self, dir: &str) -> bool {
        let dir = dir.trim_end_matches('/');
        let path = self.path.trim_start_matches("./");
        path.strip_prefix(dir).is_some_and(|rest| rest.starts_with('/'))
    }
}

/// A route exposed by the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: String,
    pub method: HttpMethod,
    pub kind: RouteKind,
    #[serde(default)]
    pub has_auth: bool,
    #[serde(default)]
    pub has_row_isolation: bool,
    #[serde(default)]
    pub has_validation: bool,
    #[serde(default)]
    pub has_rate_limit: bool,
}

impl RouteDescriptor {
    /// Create a route with every safeguard unset.
    pub fn new(path: impl Into<String>, method: HttpMethod, kind: RouteKind) -> Self {
        Self {
            path: path.into(),
            method,
            kind,
            has_auth: false,
            has_row_isolation: false,
            has_validation: false,
            has_rate_limit: false,
        }
    }

    pub fn api(path: impl Into<String>, method: HttpMethod) -> Self {
        Self::new(path, method, RouteKind::Api)
    }

    pub fn page(path: impl Into<String>) -> Self {
        Self::new(path, HttpMethod::Get, RouteKind::Page)
    }

    pub fn with_auth(mut self, value: bool) -> Self {
        self.has_auth = value;
        self
    }

    pub fn with_row_isolation(mut self, value: bool) -> Self {
        self.has_row_isolation = value;
        self
    }

    pub fn with_validation(mut self, value: bool) -> Self {
        self.has_validation = value;
        self
    }

    pub fn with_rate_limit(mut self, value: bool) -> Self {
        self.has_rate_limit = value;
        self
    }

    /// Set all four safeguards at once.
    pub fn fully_protected(self) -> Self {
        self.with_auth(true)
            .with_row_isolation(true)
            .with_validation(true)
            .with_rate_limit(true)
    }

    /// `METHOD path` label used in messages.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Everything a check may look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyContext {
    /// Module identifier
    pub module: String,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
    #[serde(default)]
    pub routes: Vec<RouteDescriptor>,
    /// Declared feature tags
    #[serde(default)]
    pub features: BTreeSet<String>,
    /// Reference to the style token document in use
    #[serde(default)]
    pub style_tokens: Option<String>,
    pub created_at: DateTime<Utc>,
    pub schema_version: String,
}

impl PolicyContext {
    /// Create an empty context for a module.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            files: Vec::new(),
            routes: Vec::new(),
            features: BTreeSet::new(),
            style_tokens: None,
            created_at: Utc::now(),
            schema_version: CONTEXT_SCHEMA_VERSION.to_string(),
        }
    }

    pub fn with_file(mut self, file: FileDescriptor) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = FileDescriptor>) -> Self {
        self.files.extend(files);
        self
    }

    pub fn with_route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_routes(mut self, routes: impl IntoIterator<Item = RouteDescriptor>) -> Self {
        self.routes.extend(routes);
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn with_style_tokens(mut self, reference: impl Into<String>) -> Self {
        self.style_tokens = Some(reference.into());
        self
    }

    /// Pin the creation time, mostly for reproducible tests.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Files of the given kind, in context order.
    pub fn files_of(&self, kind: FileKind) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter().filter(move |f| f.kind == kind)
    }

    /// Component and page files.
    pub fn ui_files(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter().filter(|f| f.kind.is_ui())
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.routes.is_empty() && self.features.is_empty()
    }
}
