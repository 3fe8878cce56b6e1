//! Router error type
//!
//! Every failure is immediate and synchronous: registration errors halt route
//! table construction, accessor errors reject the mutation and leave state
//! untouched. A request that matches no route is not an error.

use thiserror::Error;

/// Errors surfaced by route registration, lookup and session accessors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A route with this name is already registered
    #[error("route name `{0}` is already registered")]
    DuplicateRouteName(String),

    /// No route is registered under this name
    #[error("no route named `{0}`")]
    UnknownRouteName(String),

    /// Output format outside html, xml, json, file
    #[error("unsupported output format `{0}` (expected html, xml, json or file)")]
    InvalidFormat(String),

    /// Parameter keys must not be empty
    #[error("parameter name must not be empty")]
    EmptyParameterName,

    /// URL generation needs a value for a required placeholder
    #[error("route `{route}` requires parameter `{param}`")]
    MissingParameter { route: String, param: String },

    /// The path matcher could not compile a route template
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A route was registered without any HTTP method
    #[error("invalid HTTP method list `{0}`")]
    InvalidMethod(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RouterError>;
