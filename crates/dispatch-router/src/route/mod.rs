//! Route definitions
//!
//! A route is a (method, pattern, target, optional name) tuple. The pattern is
//! compiled once at registration by the configured [`PathMatcher`] and the
//! definition is read-only from then on.

pub mod pattern;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, RouterError};
pub use pattern::{CompiledPattern, PathMatcher, SegmentMatcher};

/// Name prefix that marks a route as a low-priority fallback
pub const GENERIC_PREFIX: &str = "generic.";

// ============================================================================
// Target
// ============================================================================

/// Dispatch payload attached to a route and resolved for a match
///
/// An ordered string map. The usual keys are `app`, `controller` and
/// `action`, but the router never interprets them.
///
/// # Examples
///
/// ```
/// use dispatch_router::Target;
///
/// let target = Target::triple("blog", "post", "view");
/// assert_eq!(target.controller(), Some("post"));
/// assert_eq!(target.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(BTreeMap<String, String>);

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the common app/controller/action target
    pub fn triple(
        app: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new()
            .with("app", app)
            .with("controller", controller)
            .with("action", action)
    }

    /// Adds an entry (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn app(&self) -> Option<&str> {
        self.get("app")
    }

    pub fn controller(&self) -> Option<&str> {
        self.get("controller")
    }

    pub fn action(&self) -> Option<&str> {
        self.get("action")
    }
}

impl From<BTreeMap<String, String>> for Target {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Target {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// Method set
// ============================================================================

/// HTTP methods a route answers to, e.g. `GET|POST`
///
/// Stored upper-cased; `*` accepts every method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    raw: String,
    methods: Vec<String>,
}

impl MethodSet {
    /// Parses a `|`-separated method list
    ///
    /// ```
    /// use dispatch_router::MethodSet;
    ///
    /// let methods = MethodSet::parse("get|POST").unwrap();
    /// assert!(methods.allows("post"));
    /// assert!(!methods.allows("DELETE"));
    /// assert!(MethodSet::parse(" | ").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let methods: Vec<String> = raw
            .split('|')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_ascii_uppercase)
            .collect();

        if methods.is_empty() {
            return Err(RouterError::InvalidMethod(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            methods,
        })
    }

    pub fn allows(&self, method: &str) -> bool {
        self.methods
            .iter()
            .any(|m| m == "*" || m.eq_ignore_ascii_case(method))
    }

    /// The method list as registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.methods.join("|"))
    }
}

// ============================================================================
// Route definition
// ============================================================================

/// A registered route
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    /// Methods this route answers to
    pub method: MethodSet,
    /// Template as registered, e.g. `/user/[i:id]`
    pub pattern: String,
    /// Dispatch payload
    pub target: Target,
    /// Optional unique name (for URL generation and priority)
    pub name: Option<String>,
    compiled: Arc<dyn CompiledPattern>,
}

impl RouteDefinition {
    pub(crate) fn new(
        method: MethodSet,
        target: Target,
        name: Option<String>,
        compiled: Arc<dyn CompiledPattern>,
    ) -> Self {
        Self {
            method,
            pattern: compiled.pattern().to_string(),
            target,
            name,
            compiled,
        }
    }

    /// Named and not prefixed with `generic.`
    pub fn is_priority(&self) -> bool {
        is_priority_name(self.name.as_deref())
    }

    pub fn compiled(&self) -> &dyn CompiledPattern {
        self.compiled.as_ref()
    }
}

/// True for names that get front-of-table priority
pub(crate) fn is_priority_name(name: Option<&str>) -> bool {
    name.is_some_and(|name| !name.is_empty() && !name.starts_with(GENERIC_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_set_display_normalizes() {
        let methods = MethodSet::parse("get | post").unwrap();
        assert_eq!(methods.to_string(), "GET|POST");
        assert_eq!(methods.as_str(), "get | post");
    }

    #[test]
    fn test_method_set_wildcard() {
        let methods = MethodSet::parse("*").unwrap();
        assert!(methods.allows("PATCH"));
        assert!(methods.allows("GET"));
    }

    #[test]
    fn test_method_set_empty_rejected() {
        assert_eq!(
            MethodSet::parse(""),
            Err(RouterError::InvalidMethod(String::new()))
        );
    }

    #[test]
    fn test_priority_names() {
        assert!(is_priority_name(Some("app.home")));
        assert!(!is_priority_name(Some("generic.login")));
        assert!(!is_priority_name(None));
    }

    #[test]
    fn test_target_builders() {
        let target = Target::triple("site", "user", "view").with("layout", "wide");
        assert_eq!(target.app(), Some("site"));
        assert_eq!(target.action(), Some("view"));
        assert_eq!(target.len(), 4);

        let collected: Target = [("app", "x")].into_iter().collect();
        assert_eq!(collected.app(), Some("x"));
    }
}
