//! Response output format

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RouterError;

/// Output format the response should be rendered in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Html,
    Xml,
    Json,
    File,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Html, Format::Xml, Format::Json, Format::File];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Xml => "xml",
            Format::Json => "json",
            Format::File => "file",
        }
    }
}

impl FromStr for Format {
    type Err = RouterError;

    /// Case-insensitive
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| RouterError::InvalidFormat(value.to_string()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Format {
    fn eq(&self, other: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for Format {
    fn eq(&self, other: &&str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }
}
