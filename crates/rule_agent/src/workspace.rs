//! Build a [`PolicyContext`] from a project directory.

use std::path::{Path, PathBuf};

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::context::{FileDescriptor, FileKind, PolicyContext, RouteDescriptor};
use crate::error::{RuleError, RuleResult};

/// Directories never descended into.
pub const SKIPPED_DIRS: [&str; 5] = ["node_modules", ".git", ".next", "target", "dist"];

/// Files larger than this are described without content.
pub const MAX_CONTENT_BYTES: u64 = 512 * 1024;

/// Feature added when the project carries markdown documentation.
pub const DOCS_FEATURE: &str = "docs";

/// Route manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    #[serde(default)]
    pub routes: Vec<RouteDescriptor>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl RouteManifest {
    pub fn from_file(path: &Path) -> RuleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Walks a project tree and describes the files the checks care about.
#[derive(Debug, Clone)]
pub struct ContextLoader {
    root: PathBuf,
    excludes: Vec<Pattern>,
    features: Vec<String>,
    routes: Option<PathBuf>,
    import_re: Regex,
    export_re: Regex,
}

impl ContextLoader {
    pub fn new(root: impl Into<PathBuf>) -> RuleResult<Self> {
        Ok(Self {
            root: root.into(),
            excludes: Vec::new(),
            features: Vec::new(),
            routes: None,
            import_re: compile(
                "import",
                r#"(?m)^\s*import\s+(?:type\s+)?(?:[^'";]+?\s+from\s+)?['"]([^'"]+)['"]|\brequire\(\s*['"]([^'"]+)['"]\s*\)"#,
            )?,
            export_re: compile(
                "export",
                r"(?m)^\s*export\s+(default\s+)?(?:async\s+)?(?:function\*?|const|let|var|class|interface|type|enum)?\s*([A-Za-z_$][\w$]*)?",
            )?,
        })
    }

    /// Skip paths matching a glob, relative to the root.
    pub fn with_exclude(mut self, pattern: &str) -> RuleResult<Self> {
        let compiled = Pattern::new(pattern).map_err(|e| RuleError::InvalidPattern {
            name: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.excludes.push(compiled);
        Ok(self)
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Read routes (and extra features) from a YAML manifest.
    pub fn with_routes(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.routes = Some(manifest.into());
        self
    }

    /// Describe the tree as a context for `module`.
    pub fn load(&self, module: impl Into<String>) -> RuleResult<PolicyContext> {
        if !self.root.is_dir() {
            return Err(RuleError::InvalidConfiguration(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let mut context = PolicyContext::new(module);
        let mut has_docs = false;

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = relative_path(&self.root, entry.path());
            if self.excludes.iter().any(|p| p.matches(&relative)) {
                debug!("Excluded {}", relative);
                continue;
            }

            if relative.ends_with(".md") || relative.ends_with(".mdx") {
                has_docs = true;
                continue;
            }

            let Some(kind) = FileKind::infer(&relative) else {
                continue;
            };
            context.files.push(self.describe(entry.path(), relative, kind));
        }

        for feature in &self.features {
            context.features.insert(feature.clone());
        }
        if has_docs {
            context.features.insert(DOCS_FEATURE.to_string());
        }

        if let Some(path) = &self.routes {
            let manifest = RouteManifest::from_file(path)?;
            context.features.extend(manifest.features);
            context.routes = manifest.routes;
        }

        info!(
            "Loaded {} file(s) and {} route(s) from {}",
            context.files.len(),
            context.routes.len(),
            self.root.display()
        );
        Ok(context)
    }

    fn describe(&self, path: &Path, relative: String, kind: FileKind) -> FileDescriptor {
        let file = FileDescriptor::new(relative, kind);

        let size = std::fs::metadata(path).map_or(0, |m| m.len());
        if size > MAX_CONTENT_BYTES {
            debug!("Describing {} without content ({} bytes)", file.path, size);
            return file.with_size(size as usize);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read {}: {}", file.path, e);
                return file;
            }
        };

        let imports = self.imports(&content);
        let dependencies = package_names(&imports);
        let exports = self.exports(&content);
        file.with_content(content)
            .with_imports(imports)
            .with_dependencies(dependencies)
            .with_exports(exports)
    }

    /// Module specifiers imported by `content`, in source order.
    pub fn imports(&self, content: &str) -> Vec<String> {
        self.import_re
            .captures_iter(content)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Names exported by `content`; a default export is `default`.
    pub fn exports(&self, content: &str) -> Vec<String> {
        let mut names = Vec::new();
        for caps in self.export_re.captures_iter(content) {
            let name = if caps.get(1).is_some() {
                "default".to_string()
            } else {
                match caps.get(2) {
                    Some(m) => m.as_str().to_string(),
                    None => continue,
                }
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

fn compile(name: &str, pattern: &str) -> RuleResult<Regex> {
    Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
        name: name.to_string(),
        message: e.to_string(),
    })
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Third-party package names among import specifiers.
fn package_names(imports: &[String]) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for specifier in imports {
        if specifier.starts_with('.') || specifier.starts_with('/') || specifier.starts_with("@/") || specifier.starts_with("~/") {
            continue;
        }
        let segments = if specifier.starts_with('@') { 2 } else { 1 };
        let name = specifier.split('/').take(segments).collect::<Vec<_>>().join("/");
        if !packages.contains(&name) {
            packages.push(name);
        }
    }
    packages
}
