//! Router session state
//!
//! # Data Flow
//! ```text
//! match_request(url?, method?)
//!     → fall back to RequestEnv (uri, method), then "/" and "GET"
//!     → split query, normalize path, strip "/ajax" suffix
//!     → RouteTable::find (first route in table order)
//!     → resolver::resolve (control keys, pruning, target promotion)
//!     → merge route target, apply control signal
//!     → current match stored; read back through accessors
//! ```
//!
//! A router holds the state of one request. The route table and target key
//! set sit behind `Arc` and are shared read-only by every router created with
//! [`Router::scoped`], so concurrent requests each get their own session
//! without copying the table.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::format::Format;
use crate::matched::{MatchKey, MatchResult};
use crate::path::{normalize_path, split_query, strip_ajax_suffix};
use crate::request::{QueryParams, RequestEnv};
use crate::resolver::{resolve, ControlKey, ControlSignal, Resolution};
use crate::route::{RouteDefinition, Target};
use crate::table::RouteTable;
use crate::Params;

/// Diagnostics snapshot of a router session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterStatus {
    pub url: String,
    pub route: Option<String>,
    pub ajax: bool,
    pub method: String,
    pub format: Format,
    #[serde(rename = "match")]
    pub current_match: Option<MatchResult>,
}

impl RouterStatus {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Request router: shared route table plus per-request session state
///
/// # Examples
///
/// ```
/// use dispatch_router::{Router, Target, Format};
///
/// let mut router = Router::new().with_target_params(["controller", "action"]);
/// router
///     .register("GET", "/[a:controller]/[a:action]/[i:id]", Target::new().with("app", "site"), Some("mvc"))
///     .unwrap();
///
/// router.match_request(Some("/user/view/5/ajax"), Some("GET"));
///
/// assert!(router.is_ajax());
/// assert_eq!(router.target("controller"), Some("user"));
/// assert_eq!(router.target("app"), Some("site"));
/// assert_eq!(router.param("id"), Some("5"));
/// assert_eq!(router.format(), Format::Html);
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    target_params: Arc<HashSet<String>>,
    normalize_paths: bool,
    base_url: String,
    env: RequestEnv,
    request_url: String,
    request_method: String,
    ajax: bool,
    format: Format,
    current: MatchResult,
    matched: bool,
}

impl Router {
    /// Creates a router with an empty route table
    pub fn new() -> Self {
        Self::with_table(Arc::new(RouteTable::new()))
    }

    /// Creates a router over an already built table
    pub fn with_table(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            target_params: Arc::new(HashSet::new()),
            normalize_paths: true,
            base_url: String::new(),
            env: RequestEnv::default(),
            request_url: String::new(),
            request_method: String::new(),
            ajax: false,
            format: Format::default(),
            current: MatchResult::default(),
            matched: false,
        }
    }

    /// Sets the parameter names promoted into the dispatch target
    pub fn with_target_params<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_params = Arc::new(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_env(mut self, env: RequestEnv) -> Self {
        self.env = env;
        self
    }

    /// Toggles request path normalization (on by default)
    pub fn with_path_normalization(mut self, enabled: bool) -> Self {
        self.normalize_paths = enabled;
        self
    }

    /// Fresh session sharing this router's table and configuration
    pub fn scoped(&self, env: RequestEnv) -> Self {
        let mut scoped = Self::with_table(Arc::clone(&self.table))
            .with_base_url(self.base_url.clone())
            .with_path_normalization(self.normalize_paths)
            .with_env(env);
        scoped.target_params = Arc::clone(&self.target_params);
        scoped
    }

    // ========================================================================
    // Route registration
    // ========================================================================

    /// Registers a route (see [`RouteTable::register`])
    ///
    /// The table is copied first if other routers still share it.
    pub fn register(
        &mut self,
        method: &str,
        pattern: &str,
        target: Target,
        name: Option<&str>,
    ) -> Result<()> {
        Arc::make_mut(&mut self.table).register(method, pattern, target, name)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Routes in match order
    pub fn routes(&self) -> &[RouteDefinition] {
        self.table.routes()
    }

    pub fn route_by_name(&self, name: &str) -> Option<&RouteDefinition> {
        self.table.route_by_name(name)
    }

    pub fn resolve_pattern(&self, name: &str) -> Result<&str> {
        self.table.resolve_pattern(name)
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Matches the request and stores the outcome in the session
    ///
    /// `url` and `method` default to the request environment, then to `/`
    /// and `GET`. A `/ajax` path suffix or an `ajax` query parameter marks
    /// the request as AJAX whether or not a route matches. The previous
    /// match is always discarded; `ajax` and `format` are only ever raised
    /// or changed, never reset.
    pub fn match_request(&mut self, url: Option<&str>, method: Option<&str>) {
        let url = url
            .map(str::to_string)
            .unwrap_or_else(|| self.env.uri().to_string());
        let method = method
            .filter(|m| !m.is_empty())
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| self.env.method());

        self.current = MatchResult::default();
        self.matched = false;

        let (path, query) = split_query(&url);
        let path = if self.normalize_paths {
            normalize_path(path)
        } else {
            Cow::Borrowed(path)
        };
        let (path, ajax_suffix) = strip_ajax_suffix(&path);

        let ajax_query = query.is_some_and(|q| QueryParams::parse(q).has(ControlKey::Ajax.key()))
            || self.env.query.has(ControlKey::Ajax.key());
        if ajax_suffix || ajax_query {
            self.ajax = true;
        }

        let table = Arc::clone(&self.table);
        let Some(found) = table.find(&method, &path) else {
            debug!(method = %method, url = %url, ajax = self.ajax, "no route matched");
            self.request_url = url;
            self.request_method = method;
            return;
        };

        let Resolution { mut result, control } =
            resolve(found.captures, found.route.name.as_deref(), &self.target_params);

        for (key, value) in found.route.target.iter() {
            if !result.target.contains_key(key) {
                result.target.insert(key, value);
            }
        }

        if let Some(signal) = control {
            self.apply_control(signal);
        }

        debug!(
            method = %method,
            url = %url,
            route = result.name.as_deref().unwrap_or(""),
            params = result.params.len(),
            ajax = self.ajax,
            format = %self.format,
            "route matched"
        );

        self.request_url = url;
        self.request_method = method;
        self.current = result;
        self.matched = true;
    }

    fn apply_control(&mut self, signal: ControlSignal) {
        match signal {
            ControlSignal::Ajax => self.ajax = true,
            ControlSignal::Format(value) => match value.parse() {
                Ok(format) => self.format = format,
                Err(_) => warn!(format = %value, "ignoring unsupported captured format"),
            },
        }
    }

    // ========================================================================
    // Session accessors
    // ========================================================================

    /// Whether the last `match_request` found a route
    pub fn has_match(&self) -> bool {
        self.matched
    }

    /// The session match, if a route matched or values were written into it
    ///
    /// After a failed match, `set_param`/`set` still write into the session
    /// match; it is reported here (and in [`Router::status`]) as soon as it
    /// holds anything, while [`Router::has_match`] stays `false`.
    pub fn current_match(&self) -> Option<&MatchResult> {
        (self.matched || !self.current.is_empty()).then_some(&self.current)
    }

    /// Name of the matched route
    pub fn current_route(&self) -> Option<&str> {
        self.current.name.as_deref()
    }

    pub fn is_ajax(&self) -> bool {
        self.ajax
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Sets the output format (html, xml, json, file; case-insensitive)
    ///
    /// On error the previous format is kept.
    pub fn set_format(&mut self, value: &str) -> Result<()> {
        self.format = value.parse()?;
        Ok(())
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.current.params.get(key).map(String::as_str)
    }

    pub fn set_param(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.current.set(&MatchKey::Param(key.to_string()), value)
    }

    pub fn params(&self) -> &Params {
        &self.current.params
    }

    /// Dispatch target entry, e.g. `target("controller")`
    pub fn target(&self, key: &str) -> Option<&str> {
        self.current.target.get(key)
    }

    pub fn targets(&self) -> &Target {
        &self.current.target
    }

    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    pub fn request_method(&self) -> &str {
        &self.request_method
    }

    pub fn status(&self) -> RouterStatus {
        RouterStatus {
            url: self.request_url.clone(),
            route: self.current.name.clone(),
            ajax: self.ajax,
            method: self.request_method.clone(),
            format: self.format,
            current_match: self.current_match().cloned(),
        }
    }

    // ========================================================================
    // Key view over the current match
    // ========================================================================

    /// `name`, `target.<key>`, `params.<key>` or bare `<key>` (a parameter)
    pub fn has(&self, key: &str) -> bool {
        self.current.has(&MatchKey::parse(key))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.current.get(&MatchKey::parse(key))
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.current.set(&MatchKey::parse(key), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.current.remove(&MatchKey::parse(key))
    }

    // ========================================================================
    // URL generation
    // ========================================================================

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Builds the URL of a named route, prefixed with the base URL
    ///
    /// ```
    /// use dispatch_router::{Router, Params, Target};
    ///
    /// let mut router = Router::new().with_base_url("/app");
    /// router.register("GET", "/user/[i:id]", Target::new(), Some("user.view")).unwrap();
    ///
    /// let params: Params = [("id".to_string(), "9".to_string())].into();
    /// assert_eq!(router.url("user.view", &params).unwrap(), "/app/user/9");
    /// ```
    pub fn url(&self, name: &str, params: &Params) -> Result<String> {
        let path = self.table.generate(name, params)?;
        if self.base_url.is_empty() {
            return Ok(path);
        }
        Ok(format!("{}{}", self.base_url.trim_end_matches('/'), path))
    }

    /// [`Router::url`] with parameters given as tuples
    pub fn url_for_params(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        let params: Params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.url(name, &params)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
