//! Path matcher boundary and the bundled bracket-placeholder matcher
//!
//! The router only ever talks to a matcher through [`PathMatcher`] and
//! [`CompiledPattern`]. [`SegmentMatcher`] is the implementation used by
//! default; hosts with their own template grammar plug in another one.
//!
//! # Template grammar
//!
//! | Template            | Meaning                                           |
//! |---------------------|---------------------------------------------------|
//! | `/about`            | literal, exact match                              |
//! | `/user/[i:id]`      | `id` made of digits                               |
//! | `/user/[a:slug]`    | alphanumerics                                     |
//! | `/blob/[h:sha]`     | hex digits                                        |
//! | `/docs/[*:rest]`    | anything (lazy), slashes included                 |
//! | `/files/[**:path]`  | anything (greedy)                                 |
//! | `/page/[:name]`     | one segment, no `/` or `.`                        |
//! | `/list/[i:page]?`   | optional block, `/` prefix dropped with it        |
//! | `/report.[a:fmt]`   | `.` prefixed block                                |
//! | `*`                 | every path                                        |
//! | `@^/raw/(?P<x>\d+)` | raw regular expression (searched, not anchored)   |
//!
//! Any other placeholder type text is used verbatim as a regular expression.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::path::normalize_path;
use crate::Params;

/// Named values captured from a request path
pub type Captures = HashMap<String, String>;

/// A route template compiled by a [`PathMatcher`]
pub trait CompiledPattern: fmt::Debug + Send + Sync {
    /// The template this pattern was compiled from
    fn pattern(&self) -> &str;

    /// Matches a request path, returning every named placeholder on success
    fn captures(&self, path: &str) -> Option<Captures>;

    /// Builds a path from parameter values (reverse routing)
    fn generate(&self, params: &Params) -> Result<String>;
}

/// Compiles route templates into matchers
pub trait PathMatcher: fmt::Debug + Send + Sync {
    fn compile(&self, pattern: &str) -> Result<Arc<dyn CompiledPattern>>;
}

/// One `[type:name]` placeholder block, with its `/` or `.` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub prefix: String,
    pub kind: String,
    pub name: Option<String>,
    pub optional: bool,
}

impl Placeholder {
    /// Regular expression matched by this placeholder's type
    fn type_regex(&self) -> &str {
        match self.kind.as_str() {
            "i" => "[0-9]+",
            "a" => "[0-9A-Za-z]+",
            "h" => "[0-9A-Fa-f]+",
            "*" => ".+?",
            "**" => ".+",
            "" => r"[^/\.]+",
            custom => custom,
        }
    }

    /// Wildcard values keep their slashes when generating URLs
    fn is_wildcard(&self) -> bool {
        matches!(self.kind.as_str(), "*" | "**")
    }

    fn to_regex(&self) -> String {
        let prefix = match self.prefix.as_str() {
            "." => r"\.",
            other => other,
        };
        let group = match &self.name {
            Some(name) => format!("(?P<{}>{})", name, self.type_regex()),
            None => format!("(?:{})", self.type_regex()),
        };
        let optional = if self.optional { "?" } else { "" };
        format!("(?:{}{}{}){}", prefix, group, optional, optional)
    }
}

/// A parsed piece of a route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternPiece {
    /// Literal text, matched as-is
    Literal(String),
    /// Placeholder block
    Placeholder(Placeholder),
}

static BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(/|\.|)\[([^:\]]*)(?::([^:\]]*))?\](\?|)").expect("block regex is valid")
});

/// Splits a template into literal text and placeholder blocks (pure function)
///
/// # Examples
///
/// ```
/// use dispatch_router::route::pattern::{parse_pieces, PatternPiece};
///
/// let pieces = parse_pieces("/user/[i:id]");
/// assert_eq!(pieces.len(), 2);
/// assert_eq!(pieces[0], PatternPiece::Literal("/user".to_string()));
/// assert!(matches!(&pieces[1], PatternPiece::Placeholder(p) if p.name.as_deref() == Some("id")));
/// ```
pub fn parse_pieces(pattern: &str) -> Vec<PatternPiece> {
    let mut pieces = Vec::new();
    let mut cursor = 0;

    for caps in BLOCK_REGEX.captures_iter(pattern) {
        let Some(block) = caps.get(0) else { continue };
        if block.start() > cursor {
            pieces.push(PatternPiece::Literal(pattern[cursor..block.start()].to_string()));
        }

        let text = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
        pieces.push(PatternPiece::Placeholder(Placeholder {
            prefix: text(1).to_string(),
            kind: text(2).to_string(),
            name: Some(text(3)).filter(|n| !n.is_empty()).map(str::to_string),
            optional: !text(4).is_empty(),
        }));
        cursor = block.end();
    }

    if cursor < pattern.len() {
        pieces.push(PatternPiece::Literal(pattern[cursor..].to_string()));
    }

    pieces
}

#[derive(Debug)]
enum Compiled {
    /// `*`: every path
    Any,
    /// No placeholders: exact comparison against the template or its
    /// normalized form
    Literal { normalized: String },
    /// `@...`: raw, unanchored regular expression
    Raw(Regex),
    /// Template with placeholder blocks
    Blocks {
        regex: Regex,
        pieces: Vec<PatternPiece>,
    },
}

/// Pattern compiled by [`SegmentMatcher`]
#[derive(Debug)]
pub struct SegmentPattern {
    source: String,
    compiled: Compiled,
}

impl SegmentPattern {
    /// Compiles a template (see the module docs for the grammar)
    pub fn compile(pattern: &str) -> Result<Self> {
        let invalid = |reason: String| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let compiled = if pattern == "*" {
            Compiled::Any
        } else if let Some(raw) = pattern.strip_prefix('@') {
            Compiled::Raw(Regex::new(raw).map_err(|e| invalid(e.to_string()))?)
        } else if !pattern.contains('[') {
            Compiled::Literal {
                normalized: normalize_path(pattern).into_owned(),
            }
        } else {
            let pieces = parse_pieces(pattern);
            let body: String = pieces
                .iter()
                .map(|piece| match piece {
                    PatternPiece::Literal(text) => regex::escape(text),
                    PatternPiece::Placeholder(placeholder) => placeholder.to_regex(),
                })
                .collect();
            let regex =
                Regex::new(&format!("^{}$", body)).map_err(|e| invalid(e.to_string()))?;
            Compiled::Blocks { regex, pieces }
        };

        Ok(Self {
            source: pattern.to_string(),
            compiled,
        })
    }

    fn named_captures(regex: &Regex, path: &str) -> Option<Captures> {
        let caps = regex.captures(path)?;
        Some(
            regex
                .capture_names()
                .flatten()
                .map(|name| {
                    let value = caps.name(name).map(|m| m.as_str()).unwrap_or("");
                    (name.to_string(), value.to_string())
                })
                .collect(),
        )
    }
}

impl CompiledPattern for SegmentPattern {
    fn pattern(&self) -> &str {
        &self.source
    }

    fn captures(&self, path: &str) -> Option<Captures> {
        match &self.compiled {
            Compiled::Any => Some(Captures::new()),
            Compiled::Literal { normalized } => {
                (self.source == path || normalized == path).then(Captures::new)
            }
            Compiled::Raw(regex) | Compiled::Blocks { regex, .. } => {
                Self::named_captures(regex, path)
            }
        }
    }

    fn generate(&self, params: &Params) -> Result<String> {
        let pieces = match &self.compiled {
            Compiled::Literal { .. } => return Ok(self.source.clone()),
            Compiled::Blocks { pieces, .. } => pieces,
            Compiled::Any | Compiled::Raw(_) => {
                return Err(RouterError::InvalidPattern {
                    pattern: self.source.clone(),
                    reason: "cannot generate a URL from a wildcard or raw regex route".to_string(),
                })
            }
        };

        let mut url = String::with_capacity(self.source.len());
        for piece in pieces {
            match piece {
                PatternPiece::Literal(text) => url.push_str(text),
                PatternPiece::Placeholder(placeholder) => {
                    let value = placeholder
                        .name
                        .as_deref()
                        .and_then(|name| params.get(name))
                        .filter(|value| !value.is_empty());

                    match value {
                        Some(value) => {
                            url.push_str(&placeholder.prefix);
                            if placeholder.is_wildcard() {
                                url.push_str(value);
                            } else {
                                url.push_str(&urlencoding::encode(value));
                            }
                        }
                        None if placeholder.optional => {}
                        None => {
                            return Err(RouterError::MissingParameter {
                                route: self.source.clone(),
                                param: placeholder.name.clone().unwrap_or_default(),
                            })
                        }
                    }
                }
            }
        }

        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }
}

/// Default [`PathMatcher`]: bracket placeholders compiled to regular expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentMatcher;

impl PathMatcher for SegmentMatcher {
    fn compile(&self, pattern: &str) -> Result<Arc<dyn CompiledPattern>> {
        Ok(Arc::new(SegmentPattern::compile(pattern)?))
    }
}
