//! Process-wide router
//!
//! Compatibility accessor for code that reaches the router through a global
//! instead of receiving one from the composition root. The instance is
//! created lazily on first access and lives for the rest of the process.
//! It is a single session: concurrent requests should use
//! [`Router::scoped`] copies instead of matching on the global itself.

use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::router::Router;

static GLOBAL_ROUTER: Lazy<Mutex<Router>> = Lazy::new(|| Mutex::new(Router::new()));

/// Locks and returns the process-wide router
///
/// ```
/// use dispatch_router::{global, Target};
///
/// global()
///     .register("GET", "/health", Target::new().with("action", "health"), Some("doc.health"))
///     .unwrap();
/// assert!(global().route_by_name("doc.health").is_some());
/// ```
pub fn global() -> MutexGuard<'static, Router> {
    GLOBAL_ROUTER.lock().unwrap_or_else(PoisonError::into_inner)
}
