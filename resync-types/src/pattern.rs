//! Resource patterns.
//!
//! A pattern is a dot-separated template such as `library.book.$id`. Parts
//! starting with `$` are named tags; all other parts are literals that an RID
//! must repeat verbatim.

use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Tag values extracted from a matching RID, keyed by tag name.
pub type PathParams = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Tag(String),
}

/// A parsed resource pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    parts: Vec<Part>,
}

impl Pattern {
    /// Parses a pattern string.
    ///
    /// Empty parts, empty or duplicate tag names and wildcard parts (`*`,
    /// `>`) are rejected.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: reason.to_owned(),
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }

        let mut parts = Vec::new();
        let mut seen = HashSet::new();
        for token in pattern.split('.') {
            if token.is_empty() {
                return Err(invalid("empty part"));
            }
            if token == "*" || token == ">" {
                return Err(invalid("wildcards are not supported"));
            }
            match token.strip_prefix('$') {
                Some("") => return Err(invalid("empty tag name")),
                Some(tag) => {
                    if !seen.insert(tag) {
                        return Err(invalid("duplicate tag name"));
                    }
                    parts.push(Part::Tag(tag.to_owned()));
                }
                None => parts.push(Part::Literal(token.to_owned())),
            }
        }

        Ok(Self {
            raw: pattern.to_owned(),
            parts,
        })
    }

    /// Returns the pattern as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Tag names in positional order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Tag(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Returns true if the pattern carries a tag with the given name.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().any(|t| t == tag)
    }

    /// Matches an RID against the pattern and extracts the tag values.
    ///
    /// Returns `None` if the part count differs, a literal differs, or a tag
    /// position is empty.
    #[must_use]
    pub fn matches(&self, rid: &str) -> Option<PathParams> {
        let tokens: Vec<&str> = rid.split('.').collect();
        if tokens.len() != self.parts.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (part, token) in self.parts.iter().zip(tokens) {
            match part {
                Part::Literal(literal) if literal == token => {}
                Part::Literal(_) => return None,
                Part::Tag(_) if token.is_empty() => return None,
                Part::Tag(name) => {
                    params.insert(name.clone(), token.to_owned());
                }
            }
        }
        Some(params)
    }

    /// Substitutes `value` at the position of `tag`. Other tags are left as
    /// `$name`.
    #[must_use]
    pub fn replace_tag(&self, tag: &str, value: &str) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Literal(literal) => literal.clone(),
                Part::Tag(name) if name == tag => value.to_owned(),
                Part::Tag(name) => format!("${name}"),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
