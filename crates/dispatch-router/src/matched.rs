//! Match result and its key view
//!
//! A [`MatchResult`] has a fixed shape: route name, dispatch target and public
//! parameters. Generic consumers that only know string keys go through
//! [`MatchKey`], which addresses one slot of that shape:
//!
//! | Key           | Slot                      |
//! |---------------|---------------------------|
//! | `name`        | route name                |
//! | `target.<k>`  | `target[k]`               |
//! | `params.<k>`  | `params[k]`               |
//! | `<k>`         | `params[k]` (shorthand)   |

use serde::Serialize;

use crate::error::{Result, RouterError};
use crate::route::Target;
use crate::Params;

/// Outcome of matching one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Name of the matched route, if it has one
    pub name: Option<String>,
    /// Dispatch target: route target plus promoted parameters
    pub target: Target,
    /// Public parameters
    pub params: Params,
}

/// Address of one slot of a [`MatchResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKey {
    Name,
    Target(String),
    Param(String),
}

impl MatchKey {
    /// Parses a string key (see the module docs)
    ///
    /// ```
    /// use dispatch_router::MatchKey;
    ///
    /// assert_eq!(MatchKey::parse("name"), MatchKey::Name);
    /// assert_eq!(MatchKey::parse("target.action"), MatchKey::Target("action".into()));
    /// assert_eq!(MatchKey::parse("id"), MatchKey::Param("id".into()));
    /// assert_eq!(MatchKey::parse("params.name"), MatchKey::Param("name".into()));
    /// ```
    pub fn parse(key: &str) -> Self {
        if key == "name" {
            MatchKey::Name
        } else if let Some(rest) = key.strip_prefix("target.") {
            MatchKey::Target(rest.to_string())
        } else if let Some(rest) = key.strip_prefix("params.") {
            MatchKey::Param(rest.to_string())
        } else {
            MatchKey::Param(key.to_string())
        }
    }
}

impl From<&str> for MatchKey {
    fn from(key: &str) -> Self {
        MatchKey::parse(key)
    }
}

impl MatchResult {
    /// No name, no target entries and no parameters
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.target.is_empty() && self.params.is_empty()
    }

    pub fn has(&self, key: &MatchKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &MatchKey) -> Option<&str> {
        match key {
            MatchKey::Name => self.name.as_deref(),
            MatchKey::Target(k) => self.target.get(k),
            MatchKey::Param(k) => self.params.get(k).map(String::as_str),
        }
    }

    /// Writes one slot; target and parameter keys must not be empty
    pub fn set(&mut self, key: &MatchKey, value: impl Into<String>) -> Result<()> {
        match key {
            MatchKey::Name => self.name = Some(value.into()),
            MatchKey::Target(k) | MatchKey::Param(k) if k.is_empty() => {
                return Err(RouterError::EmptyParameterName)
            }
            MatchKey::Target(k) => {
                self.target.insert(k.clone(), value);
            }
            MatchKey::Param(k) => {
                self.params.insert(k.clone(), value.into());
            }
        }
        Ok(())
    }

    /// Clears one slot, returning the previous value
    pub fn remove(&mut self, key: &MatchKey) -> Option<String> {
        match key {
            MatchKey::Name => self.name.take(),
            MatchKey::Target(k) => self.target.remove(k),
            MatchKey::Param(k) => self.params.remove(k),
        }
    }
}
