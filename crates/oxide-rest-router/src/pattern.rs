//! Path template compilation and matching.
//!
//! Templates use `{name}` or `{name:constraint}` placeholders. A constraint is
//! either one of the [`SHORT_CODES`] or a raw regular expression, which is
//! used as is.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, RouterError};
use crate::request::Params;

/// Placeholder constraint short-codes and the patterns they expand to.
///
/// The empty code is used when a placeholder has no constraint.
pub const SHORT_CODES: [(&str, &str); 6] = [
    ("i", r"\d+"),
    ("d", r"\d+"),
    ("a", "[A-Za-z]+"),
    ("alnum", "[A-Za-z0-9]+"),
    ("w", r"\w+"),
    ("", r"[-\w]+"),
];

// A raw constraint may itself contain one level of braces, e.g. `[a-z]{2}`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_-]+)(?::((?:[^{}]|\{[^{}]*\})*))?\}")
        .expect("Invalid placeholder regex")
});

/// Expands a constraint short-code, or returns the constraint unchanged.
#[must_use]
pub fn resolve_constraint(constraint: &str) -> &str {
    SHORT_CODES
        .iter()
        .find(|(code, _)| *code == constraint)
        .map_or(constraint, |(_, pattern)| *pattern)
}

/// Replaces every placeholder with a named capture group.
///
/// Templates without placeholders are returned unchanged.
///
/// # Example
///
/// ```
/// use oxide_rest_router::compile_pattern;
///
/// assert_eq!(compile_pattern("/author/{id:d}"), r"/author/(?P<id>\d+)");
/// assert_eq!(
///     compile_pattern("/author/{username:@[a-zA-Z]+}"),
///     "/author/(?P<username>@[a-zA-Z]+)"
/// );
/// assert_eq!(compile_pattern("/authors"), "/authors");
/// ```
#[must_use]
pub fn compile_pattern(template: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let constraint = caps.get(2).map_or("", |m| m.as_str());
            format!("(?P<{}>{})", &caps[1], resolve_constraint(constraint))
        })
        .into_owned()
}

/// A path template compiled into a matching pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    /// The original template.
    template: String,
    /// The pattern with capture groups.
    pattern: String,
    /// Placeholder names in order.
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Compiles a path template.
    #[must_use]
    pub fn new(template: &str) -> Self {
        let param_names: Vec<String> = PLACEHOLDER
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .collect();

        for (i, name) in param_names.iter().enumerate() {
            if param_names[..i].contains(name) {
                warn!(template, placeholder = %name, "duplicate placeholder name");
            }
        }

        Self {
            template: template.to_string(),
            pattern: compile_pattern(template),
            param_names,
        }
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns the original template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the placeholder names.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Builds a matcher for this pattern mounted under `namespace`.
    ///
    /// Matching is anchored and case-insensitive, the way REST registries
    /// match registered routes.
    pub fn matcher(&self, namespace: &str) -> Result<PathMatcher> {
        let namespace = namespace.trim_matches('/');
        let full = if namespace.is_empty() {
            self.pattern.clone()
        } else {
            format!("/{namespace}{}", self.pattern)
        };

        let regex = Regex::new(&format!("(?i)^{full}$")).map_err(|source| {
            RouterError::InvalidPattern {
                pattern: full.clone(),
                source,
            }
        })?;

        Ok(PathMatcher { route: full, regex })
    }
}

impl AsRef<str> for CompiledPattern {
    fn as_ref(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Matches request paths against a namespaced compiled pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    route: String,
    regex: Regex,
}

impl PathMatcher {
    /// Returns the namespaced route pattern.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Attempts to match a path, returning the named captures.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;

        let mut params = Params::new();
        for name in self.regex.capture_names().flatten() {
            if let Some(value) = caps.name(name) {
                params.insert(name.to_string(), Value::String(value.as_str().to_string()));
            }
        }

        Some(params)
    }
}
