//! Integration tests for dispatch-router
//!
//! Organized by feature area:
//! - Route table ordering and name uniqueness
//! - Match resolution (control keys, pruning, target promotion)
//! - AJAX framing and output format
//! - Session key view and status snapshot
//! - URL generation
//! - Global router

use dispatch_router::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashSet;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Router with generic routes registered before application routes
fn app_router() -> Router {
    let mut router = Router::new().with_target_params(["controller", "action"]);

    router
        .register("GET|POST", "/login", Target::triple("core", "auth", "login"), Some("generic.login"))
        .unwrap();
    router
        .register("GET", "/[a:controller]/[a:action]?", Target::new().with("app", "generic"), Some("generic.mvc"))
        .unwrap();
    router
        .register("GET", "/user/[i:id]", Target::triple("site", "user", "view"), Some("user.view"))
        .unwrap();
    router
        .register("GET", "/user/[a:action]", Target::triple("site", "user", "index"), Some("user.action"))
        .unwrap();
    router
        .register("GET", "/export/[i:id].[:format]", Target::triple("site", "export", "run"), None)
        .unwrap();
    router
}

// ============================================================================
// Route table
// ============================================================================

#[test]
fn test_ordering_generic_registered_first() {
    let mut table = RouteTable::new();
    table.register("GET", "/a", Target::new(), Some("generic.a")).unwrap();
    table.register("GET", "/b", Target::new(), Some("app.b")).unwrap();
    table.register("GET", "/c", Target::new(), Some("app.c")).unwrap();

    let names: Vec<_> = table.routes().iter().map(|r| r.name.clone().unwrap()).collect();
    assert_eq!(names, vec!["app.b", "app.c", "generic.a"]);
}

#[test]
fn test_ordering_groups_interleaved() {
    let router = app_router();
    let names: Vec<_> = router.routes().iter().map(|r| r.name.as_deref()).collect();
    assert_eq!(
        names,
        vec![
            Some("user.view"),
            Some("user.action"),
            Some("generic.login"),
            Some("generic.mvc"),
            None,
        ]
    );
}

#[test]
fn test_application_route_beats_earlier_generic_route() {
    let mut router = app_router();
    router.match_request(Some("/user/edit"), Some("GET"));

    assert_eq!(router.current_route(), Some("user.action"));
    assert_eq!(router.target("app"), Some("site"));
    assert_eq!(router.target("action"), Some("edit"));
}

#[test]
fn test_duplicate_route_name_rejected() {
    let mut router = app_router();
    let before = router.routes().len();

    let err = router
        .register("GET", "/other", Target::new(), Some("user.view"))
        .unwrap_err();

    assert_eq!(err, RouterError::DuplicateRouteName("user.view".to_string()));
    assert_eq!(router.routes().len(), before);
    assert_eq!(router.resolve_pattern("user.view").unwrap(), "/user/[i:id]");
}

#[test]
fn test_resolve_pattern_unknown() {
    let router = app_router();
    assert_eq!(
        router.resolve_pattern("missing"),
        Err(RouterError::UnknownRouteName("missing".to_string()))
    );
}

// ============================================================================
// Match resolution
// ============================================================================

#[test]
fn test_control_key_exclusivity() {
    let resolution = resolver::resolve(
        params(&[("ajax", "1"), ("format", "json"), ("id", "7")]),
        None,
        &HashSet::new(),
    );

    assert_eq!(resolution.control, Some(ControlSignal::Ajax));
    assert_eq!(resolution.result.params, params(&[("id", "7")]));
}

#[test]
fn test_target_promotion() {
    let target_keys: HashSet<String> = ["controller".to_string(), "action".to_string()].into();
    let resolution = resolver::resolve(
        params(&[("controller", "user"), ("action", "view"), ("id", "5")]),
        None,
        &target_keys,
    );

    assert_eq!(resolution.result.target, Target::new().with("controller", "user").with("action", "view"));
    assert_eq!(resolution.result.params, params(&[("id", "5")]));
}

#[test]
fn test_empty_value_pruning() {
    let resolution = resolver::resolve(params(&[("id", "")]), None, &HashSet::new());
    assert!(!resolution.result.params.contains_key("id"));
}

#[test]
fn test_optional_placeholder_never_surfaces_empty() {
    let mut router = app_router();
    router.match_request(Some("/blog"), Some("GET"));

    assert_eq!(router.current_route(), Some("generic.mvc"));
    assert_eq!(router.target("controller"), Some("blog"));
    assert_eq!(router.target("action"), None);
    assert!(router.params().is_empty());
}

#[test]
fn test_promoted_values_override_route_target() {
    let mut router = app_router();
    router.match_request(Some("/blog/list"), Some("GET"));

    assert_eq!(router.targets().controller(), Some("blog"));
    assert_eq!(router.targets().action(), Some("list"));
    assert_eq!(router.targets().app(), Some("generic"));
}

// ============================================================================
// AJAX framing and output format
// ============================================================================

#[test]
fn test_ajax_suffix_stripping() {
    init_tracing();
    let mut router = app_router();
    router.match_request(Some("/user/5/ajax"), Some("GET"));

    assert!(router.is_ajax());
    assert_eq!(router.current_route(), Some("user.view"));
    assert_eq!(router.param("id"), Some("5"));
    assert_eq!(router.request_url(), "/user/5/ajax");
}

#[rstest]
#[case::url_query("/user/5?ajax=1", RequestEnv::new())]
#[case::env_query("/user/5", RequestEnv::from_uri("/user/5?ajax"))]
fn test_ajax_query_indicator(#[case] url: &str, #[case] env: RequestEnv) {
    let mut router = app_router().scoped(env);
    router.match_request(Some(url), Some("GET"));

    assert!(router.is_ajax());
    assert_eq!(router.param("id"), Some("5"));
}

#[test]
fn test_not_ajax_by_default() {
    let mut router = app_router();
    router.match_request(Some("/user/5"), Some("GET"));
    assert!(!router.is_ajax());
}

#[rstest]
#[case("/export/3.json", Format::Json)]
#[case("/export/3.XML", Format::Xml)]
#[case("/export/3.file", Format::File)]
#[case("/export/3.csv", Format::Html)]
fn test_captured_format(#[case] url: &str, #[case] expected: Format) {
    let mut router = app_router();
    router.match_request(Some(url), Some("GET"));

    assert!(router.has_match());
    assert_eq!(router.format(), expected);
    assert_eq!(router.params(), &params(&[("id", "3")]));
}

#[test]
fn test_format_validation_round_trip() {
    let mut router = app_router();

    router.set_format("JSON").unwrap();
    assert!(router.format() == "json");

    assert_eq!(
        router.set_format("yaml"),
        Err(RouterError::InvalidFormat("yaml".to_string()))
    );
    assert_eq!(router.format(), Format::Json);
}

#[test]
fn test_no_match_idempotence() {
    let mut router = app_router();
    router.set_format("xml").unwrap();
    router.match_request(Some("/user/5"), Some("GET"));
    assert!(router.has_match());

    router.match_request(Some("/no/such/route/here"), Some("GET"));

    assert!(!router.has_match());
    assert!(!router.is_ajax());
    assert_eq!(router.format(), Format::Xml);
    assert_eq!(router.target("controller"), None);
    assert!(router.params().is_empty());
}

#[test]
fn test_no_match_still_detects_ajax_suffix() {
    let mut router = app_router();
    router.match_request(Some("/no/such/route/here/ajax"), Some("GET"));
    assert!(!router.has_match());
    assert!(router.is_ajax());
}

#[rstest]
#[case("GET", true)]
#[case("post", true)]
#[case("DELETE", false)]
fn test_method_sets(#[case] method: &str, #[case] matches: bool) {
    let mut router = app_router();
    router.match_request(Some("/login"), Some(method));
    assert_eq!(router.current_route() == Some("generic.login"), matches);
}

#[test]
fn test_path_normalization() {
    let mut router = app_router();
    router.match_request(Some("//user//5/"), Some("GET"));
    assert_eq!(router.param("id"), Some("5"));

    let mut strict = app_router().with_path_normalization(false);
    strict.match_request(Some("/user/5/"), Some("GET"));
    assert!(!strict.has_match());
}

#[rstest]
#[case(true, "/about")]
#[case(true, "/about/")]
#[case(false, "/about/")]
fn test_trailing_slash_literal_route_matches(#[case] normalize: bool, #[case] url: &str) {
    let mut router = Router::new().with_path_normalization(normalize);
    router
        .register("GET", "/about/", Target::triple("site", "pages", "about"), Some("about"))
        .unwrap();

    router.match_request(Some(url), Some("GET"));
    assert_eq!(router.current_route(), Some("about"));
    assert_eq!(router.url("about", &Params::new()).unwrap(), "/about/");
}

#[test]
fn test_request_defaults() {
    let mut router = Router::new();
    router
        .register("GET", "/", Target::triple("site", "home", "index"), Some("home"))
        .unwrap();

    router.match_request(None, None);

    assert_eq!(router.request_url(), "/");
    assert_eq!(router.request_method(), "GET");
    assert_eq!(router.current_route(), Some("home"));
}

#[test]
fn test_absent_optional_ajax_block_does_not_frame_request() {
    let mut router = Router::new();
    router
        .register("GET", "/list/[:ajax]?", Target::triple("site", "list", "index"), Some("list"))
        .unwrap();

    router.match_request(Some("/list"), Some("GET"));
    assert!(router.has_match());
    assert!(!router.is_ajax());
    assert!(!router.has("ajax"));

    router.match_request(Some("/list/partial"), Some("GET"));
    assert!(router.is_ajax());
}

#[test]
fn test_absent_optional_ajax_does_not_mask_captured_format() {
    let mut router = Router::new();
    router
        .register("GET", "/r/[:ajax]?.[:format]", Target::triple("site", "report", "show"), None)
        .unwrap();

    router.match_request(Some("/r.json"), Some("GET"));
    assert!(router.has_match());
    assert!(!router.is_ajax());
    assert_eq!(router.format(), Format::Json);
    assert!(router.params().is_empty());
}

#[test]
fn test_absent_optional_format_keeps_current_format() {
    init_tracing();
    let mut router = Router::new();
    router
        .register("GET", "/u/[i:id].[:format]?", Target::triple("site", "user", "view"), None)
        .unwrap();

    router.set_format("xml").unwrap();
    router.match_request(Some("/u/5"), Some("GET"));
    assert_eq!(router.param("id"), Some("5"));
    assert_eq!(router.format(), Format::Xml);
    assert!(!router.has("format"));

    router.match_request(Some("/u/5.json"), Some("GET"));
    assert_eq!(router.format(), Format::Json);
}

// ============================================================================
// Key view and status
// ============================================================================

#[test]
fn test_key_view_over_match() {
    let mut router = app_router();
    router.match_request(Some("/user/5"), Some("GET"));

    assert!(router.has("name"));
    assert_eq!(router.get("name"), Some("user.view"));
    assert_eq!(router.get("target.controller"), Some("user"));
    assert_eq!(router.get("id"), Some("5"));
    assert_eq!(router.get("params.id"), Some("5"));

    router.set("target.action", "edit").unwrap();
    assert_eq!(router.target("action"), Some("edit"));

    assert_eq!(router.remove("id"), Some("5".to_string()));
    assert!(!router.has("id"));

    assert_eq!(router.set("params.", "x"), Err(RouterError::EmptyParameterName));
}

#[test]
fn test_status_snapshot() {
    let mut router = app_router();
    router.match_request(Some("/user/5/ajax"), Some("get"));

    let status = router.status();
    assert_eq!(status.url, "/user/5/ajax");
    assert_eq!(status.method, "GET");
    assert_eq!(status.route.as_deref(), Some("user.view"));
    assert!(status.ajax);
    assert_eq!(status.format, Format::Html);

    let json = status.to_json();
    assert_eq!(json["format"], "html");
    assert_eq!(json["match"]["params"]["id"], "5");
    assert_eq!(json["match"]["target"]["controller"], "user");
}

#[test]
fn test_status_without_match() {
    let mut router = app_router();
    router.match_request(Some("/nope/nope/nope"), Some("GET"));

    let status = router.status();
    assert_eq!(status.current_match, None);
    assert!(status.to_json()["match"].is_null());
}

// ============================================================================
// URL generation
// ============================================================================

#[test]
fn test_url_generation_with_base_url() {
    let mut router = app_router();
    assert_eq!(router.url_for_params("user.view", &[("id", "8")]).unwrap(), "/user/8");

    router.set_base_url("https://example.com/");
    assert_eq!(router.base_url(), "https://example.com/");
    assert_eq!(
        router.url_for_params("user.view", &[("id", "8")]).unwrap(),
        "https://example.com/user/8"
    );
}

#[test]
fn test_url_generation_errors() {
    let router = app_router();
    assert_eq!(
        router.url("nope", &Params::new()),
        Err(RouterError::UnknownRouteName("nope".to_string()))
    );
    assert_eq!(
        router.url("user.view", &Params::new()),
        Err(RouterError::MissingParameter {
            route: "user.view".to_string(),
            param: "id".to_string(),
        })
    );
}

#[test]
fn test_url_generation_optional_block() {
    let router = app_router();
    assert_eq!(router.url_for_params("generic.mvc", &[("controller", "blog")]).unwrap(), "/blog");
    assert_eq!(
        router
            .url_for_params("generic.mvc", &[("controller", "blog"), ("action", "list")])
            .unwrap(),
        "/blog/list"
    );
}

// ============================================================================
// Custom path matcher
// ============================================================================

/// Matches literal prefixes and reports the remainder as `rest`
#[derive(Debug)]
struct PrefixMatcher;

#[derive(Debug)]
struct PrefixPattern(String);

impl CompiledPattern for PrefixPattern {
    fn pattern(&self) -> &str {
        &self.0
    }

    fn captures(&self, path: &str) -> Option<Captures> {
        let rest = path.strip_prefix(self.0.as_str())?;
        Some([("rest".to_string(), rest.to_string())].into())
    }

    fn generate(&self, params: &Params) -> Result<String> {
        Ok(format!("{}{}", self.0, params.get("rest").map(String::as_str).unwrap_or("")))
    }
}

impl PathMatcher for PrefixMatcher {
    fn compile(&self, pattern: &str) -> Result<std::sync::Arc<dyn CompiledPattern>> {
        Ok(std::sync::Arc::new(PrefixPattern(pattern.to_string())))
    }
}

#[test]
fn test_custom_path_matcher() {
    let mut table = RouteTable::with_matcher(std::sync::Arc::new(PrefixMatcher));
    table.register("GET", "/static/", Target::new().with("action", "asset"), Some("asset")).unwrap();

    let mut router = Router::with_table(std::sync::Arc::new(table));
    router.match_request(Some("/static/css/site.css"), None);

    assert_eq!(router.target("action"), Some("asset"));
    assert_eq!(router.param("rest"), Some("css/site.css"));
    assert_eq!(router.url_for_params("asset", &[("rest", "a.js")]).unwrap(), "/static/a.js");
}

// ============================================================================
// Global router
// ============================================================================

#[test]
fn test_global_router_is_single_instance() {
    global()
        .register("GET", "/global/[i:id]", Target::new().with("action", "global"), Some("it.global"))
        .unwrap();

    let mut scoped = global().scoped(RequestEnv::from_uri("/global/3"));
    scoped.match_request(None, None);

    assert_eq!(scoped.target("action"), Some("global"));
    assert!(global().route_by_name("it.global").is_some());
    assert!(matches!(
        global().register("GET", "/again", Target::new(), Some("it.global")),
        Err(RouterError::DuplicateRouteName(_))
    ));
}
