// File: src/config.rs
// Purpose: Router configuration parsing from TOML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::route::Target;
use crate::router::Router;
use crate::table::RouteTable;

/// Router configuration
///
/// ```toml
/// base_url = "/app"
/// target_params = ["controller", "action"]
///
/// [[routes]]
/// name = "user.view"
/// pattern = "/user/[i:id]"
/// target = { app = "site", controller = "user", action = "view" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Prefix for generated URLs
    #[serde(default)]
    pub base_url: String,

    /// Captured parameters moved into the dispatch target
    #[serde(default)]
    pub target_params: Vec<String>,

    /// Normalize request paths before matching (default: true)
    #[serde(default = "default_true")]
    pub normalize_paths: bool,

    /// Routes, in registration order
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// One configured route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Method list, e.g. "GET|POST" (default: "GET")
    #[serde(default = "default_method")]
    pub method: String,

    pub pattern: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub target: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_method() -> String {
    "GET".to_string()
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            target_params: Vec::new(),
            normalize_paths: default_true(),
            routes: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read router config: {}", path.display()))?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid router config: {}", path.display()))?;

        info!(
            path = %path.display(),
            routes = config.routes.len(),
            "router config loaded"
        );
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse router config")
    }

    /// Registers every configured route, in file order, into a new table
    pub fn build_table(&self) -> Result<RouteTable> {
        let mut table = RouteTable::new();
        for route in &self.routes {
            table
                .register(
                    &route.method,
                    &route.pattern,
                    Target::from(route.target.clone()),
                    route.name.as_deref(),
                )
                .with_context(|| format!("Failed to register route `{}`", route.pattern))?;
        }
        Ok(table)
    }
}

impl Router {
    /// Builds a router from configuration
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let table = config.build_table()?;
        Ok(Router::with_table(Arc::new(table))
            .with_target_params(config.target_params.iter().cloned())
            .with_base_url(config.base_url.clone())
            .with_path_normalization(config.normalize_paths))
    }
}
