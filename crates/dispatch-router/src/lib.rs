//! # Dispatch Router
//!
//! Request-routing layer that sits between the HTTP entry point and the
//! application dispatcher:
//! - Ordered route table (application routes ahead of `generic.*` fallbacks)
//! - Unique route names with reverse lookup and URL generation
//! - Control parameters (`ajax`, `format`) stripped from captured values
//! - Configured parameters promoted into the dispatch target
//! - Per-request session state: current match, AJAX flag, output format
//!
//! Pattern compilation and path matching sit behind the [`PathMatcher`]
//! trait; [`SegmentMatcher`] is the bundled implementation.
//!
//! ## Example
//!
//! ```
//! use dispatch_router::{Router, Target, Format};
//!
//! let mut router = Router::new().with_target_params(["controller", "action"]);
//! router.register("GET", "/login", Target::triple("core", "auth", "login"), Some("generic.login")).unwrap();
//! router.register("GET", "/user/[i:id]", Target::triple("site", "user", "view"), Some("user.view")).unwrap();
//!
//! router.match_request(Some("/user/42/ajax"), Some("GET"));
//!
//! assert_eq!(router.current_route(), Some("user.view"));
//! assert_eq!(router.target("action"), Some("view"));
//! assert_eq!(router.param("id"), Some("42"));
//! assert!(router.is_ajax());
//! assert_eq!(router.format(), Format::Html);
//! ```

use std::collections::HashMap;

mod config;
mod error;
mod format;
mod global;
mod matched;
pub mod path;
mod request;
pub mod resolver;
pub mod route;
mod router;
mod table;

/// Public parameters of a match, and parameter input for URL generation
pub type Params = HashMap<String, String>;

pub use config::{RouteConfig, RouterConfig};
pub use error::{Result, RouterError};
pub use format::Format;
pub use global::global;
pub use matched::{MatchKey, MatchResult};
pub use request::{QueryParams, RequestEnv};
pub use resolver::{ControlKey, ControlSignal, Resolution};
pub use route::pattern::{Captures, SegmentPattern};
pub use route::{CompiledPattern, MethodSet, PathMatcher, RouteDefinition, SegmentMatcher, Target};
pub use router::{Router, RouterStatus};
pub use table::{RawMatch, RouteTable};

