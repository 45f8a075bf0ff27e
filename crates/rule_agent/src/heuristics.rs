//! Named predicates over file descriptors.
//!
//! Checks never match raw text themselves. Each rule asks a named
//! [`Heuristic`], so the matching strategy can change per predicate without
//! touching the check's control flow. Files without content never match a
//! content predicate.

use std::fmt;

use regex::Regex;

use crate::context::FileDescriptor;
use crate::error::{RuleError, RuleResult};

/// A named, independently testable predicate over one file.
pub trait Heuristic: Send + Sync {
    fn name(&self) -> &str;

    fn matches(&self, file: &FileDescriptor) -> bool;
}

/// Regular expression over the file content.
#[derive(Clone)]
pub struct PatternHeuristic {
    name: String,
    regex: Regex,
}

impl PatternHeuristic {
    pub fn new(name: impl Into<String>, pattern: &str) -> RuleResult<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
            name: name.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { name, regex })
    }

    /// Every match in the file content.
    pub fn find_all<'a>(&self, file: &'a FileDescriptor) -> Vec<&'a str> {
        match &file.content {
            Some(content) => self.regex.find_iter(content).map(|m| m.as_str()).collect(),
            None => Vec::new(),
        }
    }

    /// Capture groups (without the whole match) of every match.
    pub fn captures<'a>(&self, file: &'a FileDescriptor) -> Vec<Vec<Option<&'a str>>> {
        let Some(content) = &file.content else {
            return Vec::new();
        };
        self.regex
            .captures_iter(content)
            .map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str()))
                    .collect()
            })
            .collect()
    }

    /// Number of matches.
    pub fn count(&self, file: &FileDescriptor) -> usize {
        file.content
            .as_deref()
            .map_or(0, |c| self.regex.find_iter(c).count())
    }
}

impl Heuristic for PatternHeuristic {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, file: &FileDescriptor) -> bool {
        file.content.as_deref().is_some_and(|c| self.regex.is_match(c))
    }
}

impl fmt::Debug for PatternHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternHeuristic")
            .field("name", &self.name)
            .field("pattern", &self.regex.as_str())
            .finish()
    }
}

/// Any of a list of literal tokens, usually taken from a fixture.
#[derive(Debug, Clone)]
pub struct TokenHeuristic {
    name: String,
    tokens: Vec<String>,
}

impl TokenHeuristic {
    pub fn new(name: impl Into<String>, tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_match_str(&self, text: &str) -> bool {
        self.tokens.iter().any(|t| !t.is_empty() && text.contains(t.as_str()))
    }
}

impl Heuristic for TokenHeuristic {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, file: &FileDescriptor) -> bool {
        file.content.as_deref().is_some_and(|c| self.is_match_str(c))
    }
}

/// Arbitrary function over the descriptor, for rules that need more than
/// one pattern or look at the path.
#[derive(Clone)]
pub struct FnHeuristic {
    name: &'static str,
    predicate: fn(&FileDescriptor) -> bool,
}

impl FnHeuristic {
    pub const fn new(name: &'static str, predicate: fn(&FileDescriptor) -> bool) -> Self {
        Self { name, predicate }
    }
}

impl Heuristic for FnHeuristic {
    fn name(&self) -> &str {
        self.name
    }

    fn matches(&self, file: &FileDescriptor) -> bool {
        (self.predicate)(file)
    }
}

impl fmt::Debug for FnHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHeuristic").field("name", &self.name).finish()
    }
}
