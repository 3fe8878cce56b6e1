//! Route table
//!
//! Ordered route storage plus the `name → pattern` index.
//!
//! # Ordering
//!
//! Routes are registered in two waves in most applications: shared utility
//! routes (login, assets, ...) named `generic.*`, and application routes.
//! Registration order alone would let an early generic route shadow a
//! structurally similar application route, so the table keeps two groups:
//!
//! ```text
//! [ named, non-generic routes ... | unnamed and generic.* routes ... ]
//!   ^ inserted at the end of       ^ appended at the end of the table
//!     the front group
//! ```
//!
//! Relative registration order is preserved inside each group, and matching
//! walks the table front to back, first match wins.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::route::pattern::Captures;
use crate::route::{is_priority_name, MethodSet, PathMatcher, RouteDefinition, SegmentMatcher, Target};
use crate::Params;

/// A structural match: the route that matched and its raw captures
#[derive(Debug, Clone)]
pub struct RawMatch<'a> {
    pub route: &'a RouteDefinition,
    pub captures: Captures,
}

/// Ordered collection of routes, built at startup and read-only afterwards
///
/// # Examples
///
/// ```
/// use dispatch_router::{RouteTable, Target};
///
/// let mut table = RouteTable::new();
/// table.register("GET", "/login", Target::triple("site", "auth", "login"), Some("generic.login")).unwrap();
/// table.register("GET", "/[:page]", Target::triple("site", "page", "show"), Some("app.page")).unwrap();
///
/// let names: Vec<_> = table.routes().iter().map(|r| r.name.as_deref()).collect();
/// assert_eq!(names, vec![Some("app.page"), Some("generic.login")]);
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    named_routes: HashMap<String, String>,
    /// Number of routes in the front (priority) group
    priority_len: usize,
    matcher: Arc<dyn PathMatcher>,
}

impl RouteTable {
    /// Creates an empty table using the bundled [`SegmentMatcher`]
    pub fn new() -> Self {
        Self::with_matcher(Arc::new(SegmentMatcher))
    }

    /// Creates an empty table compiling patterns with `matcher`
    pub fn with_matcher(matcher: Arc<dyn PathMatcher>) -> Self {
        Self {
            routes: Vec::new(),
            named_routes: HashMap::new(),
            priority_len: 0,
            matcher,
        }
    }

    /// Registers a route
    ///
    /// Named, non-generic routes go to the end of the front group; every
    /// other route is appended. An empty name counts as no name.
    ///
    /// # Errors
    ///
    /// - [`RouterError::DuplicateRouteName`] if the name is already indexed
    /// - [`RouterError::InvalidMethod`] / [`RouterError::InvalidPattern`] if
    ///   the method list or template is unusable
    ///
    /// The table is unchanged when registration fails.
    pub fn register(
        &mut self,
        method: &str,
        pattern: &str,
        target: Target,
        name: Option<&str>,
    ) -> Result<()> {
        let name = name.filter(|n| !n.is_empty());

        if let Some(name) = name {
            if self.named_routes.contains_key(name) {
                return Err(RouterError::DuplicateRouteName(name.to_string()));
            }
        }

        let methods = MethodSet::parse(method)?;
        let compiled = self.matcher.compile(pattern)?;
        let route = RouteDefinition::new(methods, target, name.map(str::to_string), compiled);

        if let Some(name) = name {
            self.named_routes.insert(name.to_string(), pattern.to_string());
        }

        let priority = is_priority_name(name);
        let position = if priority {
            self.routes.insert(self.priority_len, route);
            self.priority_len += 1;
            self.priority_len - 1
        } else {
            self.routes.push(route);
            self.routes.len() - 1
        };

        debug!(
            method,
            pattern,
            name = name.unwrap_or(""),
            position,
            priority,
            "registered route"
        );

        Ok(())
    }

    /// Routes in match order
    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Pattern registered under `name`
    pub fn resolve_pattern(&self, name: &str) -> Result<&str> {
        self.named_routes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))
    }

    /// Route registered under `name`
    pub fn route_by_name(&self, name: &str) -> Option<&RouteDefinition> {
        if !self.named_routes.contains_key(name) {
            return None;
        }
        self.routes
            .iter()
            .find(|route| route.name.as_deref() == Some(name))
    }

    /// First route, in table order, whose method set and pattern accept the request
    pub fn find(&self, method: &str, path: &str) -> Option<RawMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method.allows(method))
            .find_map(|route| {
                route
                    .compiled()
                    .captures(path)
                    .map(|captures| RawMatch { route, captures })
            })
    }

    /// Builds a path for the named route
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownRouteName`] for an unregistered name, or whatever
    /// the matcher reports for missing parameters.
    pub fn generate(&self, name: &str, params: &Params) -> Result<String> {
        let route = self
            .route_by_name(name)
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;

        route.compiled().generate(params).map_err(|err| match err {
            RouterError::MissingParameter { param, .. } => RouterError::MissingParameter {
                route: name.to_string(),
                param,
            },
            other => other,
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(table: &RouteTable) -> Vec<Option<&str>> {
        table.routes().iter().map(|r| r.name.as_deref()).collect()
    }

    #[test]
    fn test_front_group_preserves_registration_order() {
        let mut table = RouteTable::new();
        table.register("GET", "/a", Target::new(), Some("generic.a")).unwrap();
        table.register("GET", "/b", Target::new(), Some("app.b")).unwrap();
        table.register("GET", "/c", Target::new(), Some("app.c")).unwrap();

        assert_eq!(names(&table), vec![Some("app.b"), Some("app.c"), Some("generic.a")]);
    }

    #[test]
    fn test_unnamed_routes_append() {
        let mut table = RouteTable::new();
        table.register("GET", "/x", Target::new(), None).unwrap();
        table.register("GET", "/y", Target::new(), Some("generic.y")).unwrap();
        table.register("GET", "/z", Target::new(), Some("")).unwrap();
        table.register("GET", "/w", Target::new(), Some("app.w")).unwrap();

        let patterns: Vec<&str> = table.routes().iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/w", "/x", "/y", "/z"]);
    }

    #[test]
    fn test_duplicate_name_leaves_table_unchanged() {
        let mut table = RouteTable::new();
        table.register("GET", "/one", Target::new(), Some("dup")).unwrap();
        let err = table.register("POST", "/two", Target::new(), Some("dup")).unwrap_err();

        assert_eq!(err, RouterError::DuplicateRouteName("dup".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve_pattern("dup").unwrap(), "/one");
    }

    #[test]
    fn test_empty_names_never_collide() {
        let mut table = RouteTable::new();
        table.register("GET", "/one", Target::new(), Some("")).unwrap();
        table.register("GET", "/two", Target::new(), Some("")).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_leaves_name_free() {
        let mut table = RouteTable::new();
        assert!(table
            .register("GET", "/[i:id]/[i:id]", Target::new(), Some("bad"))
            .is_err());
        assert!(table.resolve_pattern("bad").is_err());
        table.register("GET", "/ok", Target::new(), Some("bad")).unwrap();
    }

    #[test]
    fn test_resolve_unknown_name() {
        let table = RouteTable::new();
        assert_eq!(
            table.resolve_pattern("nope"),
            Err(RouterError::UnknownRouteName("nope".to_string()))
        );
    }

    #[test]
    fn test_find_respects_method_and_order() {
        let mut table = RouteTable::new();
        table.register("POST", "/user/[i:id]", Target::new().with("action", "update"), None).unwrap();
        table.register("GET", "/user/[i:id]", Target::new().with("action", "view"), None).unwrap();
        table.register("GET", "/user/[:slug]", Target::new().with("action", "slug"), None).unwrap();

        let found = table.find("GET", "/user/9").unwrap();
        assert_eq!(found.route.target.action(), Some("view"));
        assert_eq!(found.captures.get("id"), Some(&"9".to_string()));

        let found = table.find("POST", "/user/9").unwrap();
        assert_eq!(found.route.target.action(), Some("update"));

        assert!(table.find("DELETE", "/user/9").is_none());
    }

    #[test]
    fn test_generate_reports_route_name() {
        let mut table = RouteTable::new();
        table.register("GET", "/user/[i:id]", Target::new(), Some("user.view")).unwrap();

        let mut params = Params::new();
        assert_eq!(
            table.generate("user.view", &params),
            Err(RouterError::MissingParameter {
                route: "user.view".to_string(),
                param: "id".to_string(),
            })
        );

        params.insert("id".to_string(), "3".to_string());
        assert_eq!(table.generate("user.view", &params).unwrap(), "/user/3");
        assert!(matches!(
            table.generate("nope", &params),
            Err(RouterError::UnknownRouteName(_))
        ));
    }
}
