//! Minimal selectors for region and exclusion lists.
//!
//! Only the three forms the extractor needs are supported: a bare tag name
//! (`main`), a class (`.sidebar`) and an attribute test (`[role="main"]`,
//! or `[hidden]` for presence).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::node::Element;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    Tag(String),
    Class(String),
    Attr { name: String, value: Option<String> },
}

impl Selector {
    pub fn matches(&self, el: &Element) -> bool {
        match self {
            Selector::Tag(tag) => el.tag == *tag,
            Selector::Class(class) => el.has_class(class),
            Selector::Attr { name, value: None } => el.attr(name).is_some(),
            Selector::Attr {
                name,
                value: Some(value),
            } => el.attr(name) == Some(value.as_str()),
        }
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || Error::InvalidSelector(s.to_string());

        if let Some(class) = s.strip_prefix('.') {
            if !is_ident(class) {
                return Err(invalid());
            }
            return Ok(Selector::Class(class.to_string()));
        }

        if let Some(body) = s.strip_prefix('[') {
            let body = body.strip_suffix(']').ok_or_else(invalid)?;
            let (name, value) = match body.split_once('=') {
                Some((name, value)) => {
                    let value = value.trim();
                    let unquoted = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                        .unwrap_or(value);
                    (name.trim(), Some(unquoted.to_string()))
                }
                None => (body.trim(), None),
            };
            if !is_ident(name) {
                return Err(invalid());
            }
            return Ok(Selector::Attr {
                name: name.to_ascii_lowercase(),
                value,
            });
        }

        if is_ident(s) {
            Ok(Selector::Tag(s.to_ascii_lowercase()))
        } else {
            Err(invalid())
        }
    }
}

impl TryFrom<String> for Selector {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(tag) => f.write_str(tag),
            Selector::Class(class) => write!(f, ".{class}"),
            Selector::Attr { name, value: None } => write!(f, "[{name}]"),
            Selector::Attr {
                name,
                value: Some(value),
            } => write!(f, "[{name}=\"{value}\"]"),
        }
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
