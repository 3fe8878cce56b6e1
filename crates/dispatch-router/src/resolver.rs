//! Match resolver
//!
//! Turns the raw captures of a structural match into a [`MatchResult`]:
//!
//! 1. Control keys (`ajax`, `format`) are scanned in that order. Only the
//!    first one present with a non-empty value produces a [`ControlSignal`];
//!    every control key is removed from the parameters either way.
//! 2. Parameters with an empty value are dropped.
//! 3. Parameters listed in the target key set move from `params` to `target`.
//!
//! The resolver never fails and never touches session state; the caller
//! applies the returned signal.

use std::collections::HashSet;

use crate::matched::MatchResult;
use crate::route::pattern::Captures;

/// Captured keys with routing-policy meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Ajax,
    Format,
}

impl ControlKey {
    /// Scan order; the first key present wins
    pub const ORDERED: [ControlKey; 2] = [ControlKey::Ajax, ControlKey::Format];

    pub fn key(&self) -> &'static str {
        match self {
            ControlKey::Ajax => "ajax",
            ControlKey::Format => "format",
        }
    }

    fn signal(&self, value: String) -> ControlSignal {
        match self {
            ControlKey::Ajax => ControlSignal::Ajax,
            ControlKey::Format => ControlSignal::Format(value),
        }
    }
}

/// Effect a control key has on the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlSignal {
    /// Mark the request as AJAX
    Ajax,
    /// Switch the output format to the captured value
    Format(String),
}

/// Resolver output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub result: MatchResult,
    pub control: Option<ControlSignal>,
}

/// Partitions raw captures into control signal, target and public parameters
///
/// # Examples
///
/// ```
/// use dispatch_router::resolver::{resolve, ControlSignal};
/// use std::collections::{HashMap, HashSet};
///
/// let raw: HashMap<String, String> = [("controller", "user"), ("id", "5"), ("format", "json")]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), v.to_string()))
///     .collect();
/// let target_keys: HashSet<String> = ["controller".to_string()].into();
///
/// let resolution = resolve(raw, Some("user.view"), &target_keys);
/// assert_eq!(resolution.control, Some(ControlSignal::Format("json".into())));
/// assert_eq!(resolution.result.target.controller(), Some("user"));
/// assert_eq!(resolution.result.params.len(), 1);
/// ```
pub fn resolve(raw: Captures, name: Option<&str>, target_keys: &HashSet<String>) -> Resolution {
    let mut result = MatchResult {
        name: name.filter(|n| !n.is_empty()).map(str::to_string),
        params: raw,
        ..MatchResult::default()
    };

    let mut control = None;
    for key in ControlKey::ORDERED {
        if let Some(value) = result.params.remove(key.key()) {
            // an optional block that did not participate reports ""
            if control.is_none() && !value.is_empty() {
                control = Some(key.signal(value));
            }
        }
    }

    result.params.retain(|_, value| !value.is_empty());

    let promoted: Vec<String> = result
        .params
        .keys()
        .filter(|key| target_keys.contains(key.as_str()))
        .cloned()
        .collect();
    for key in promoted {
        if let Some(value) = result.params.remove(&key) {
            result.target.insert(key, value);
        }
    }

    Resolution { result, control }
}
