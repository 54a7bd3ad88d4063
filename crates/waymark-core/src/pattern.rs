//! Route pattern grammar.
//!
//! A pattern is a `/`-separated path template. Each segment is either a
//! literal, a single-segment wildcard `{name}`, a trailing multi-segment
//! wildcard `{name...}`, or the trailing-slash marker `{$}`:
//!
//! ```text
//! /users/{id}/files/{path...}
//! /posts/{slug}/{$}
//! ```
//!
//! A trailing `/` with nothing after it is the same as an explicit `{$}`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Marker that turns a wildcard into a multi-segment wildcard.
const MULTI_SUFFIX: &str = "...";

/// Wildcard body for the explicit trailing-slash marker.
const TRAILING_SLASH_MARKER: &str = "$";

/// Pattern parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The pattern string was empty.
    #[error("Empty pattern")]
    Empty,

    /// The pattern did not start with `/`.
    #[error("Pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    /// Two consecutive slashes in the middle of the pattern.
    #[error("Pattern {0:?} contains an empty segment")]
    EmptySegment(String),

    /// Braces that do not span a whole segment, or are unbalanced.
    #[error("Pattern {pattern:?} has a malformed wildcard segment {segment:?}")]
    MalformedWildcard {
        /// The full pattern.
        pattern: String,
        /// The offending segment.
        segment: String,
    },

    /// A wildcard name that is not an identifier.
    #[error("Pattern {pattern:?} has an invalid wildcard name {name:?}")]
    InvalidName {
        /// The full pattern.
        pattern: String,
        /// The offending name.
        name: String,
    },

    /// The same wildcard name used twice.
    #[error("Pattern {pattern:?} uses wildcard name {name:?} more than once")]
    DuplicateName {
        /// The full pattern.
        pattern: String,
        /// The repeated name.
        name: String,
    },

    /// A `{name...}` wildcard followed by more segments.
    #[error("Pattern {0:?} has a multi-segment wildcard that is not the final segment")]
    MultiNotFinal(String),

    /// A `{$}` marker followed by more segments.
    #[error("Pattern {0:?} has a trailing-slash marker that is not the final segment")]
    TrailingSlashNotFinal(String),
}

/// One slash-delimited unit of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches exactly one path segment equal to the text.
    Literal(String),
    /// Matches exactly one non-empty path segment and binds it.
    Single(String),
    /// Matches everything after the preceding slash, possibly nothing.
    Multi(Option<String>),
    /// Matches a path that ends in `/` here.
    TrailingSlash,
}

impl Segment {
    /// Returns `true` for single and multi wildcards.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Single(_) | Segment::Multi(_))
    }

    /// Returns `true` for the multi-segment wildcard.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Segment::Multi(_))
    }

    /// The name bound by a wildcard, if any.
    #[must_use]
    pub fn wildcard_name(&self) -> Option<&str> {
        match self {
            Segment::Single(name) => Some(name.as_str()),
            Segment::Multi(name) => name.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if both segments match the same path elements.
    /// Wildcard names are ignored.
    #[must_use]
    pub fn same_shape(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Single(_), Segment::Single(_))
            | (Segment::Multi(_), Segment::Multi(_))
            | (Segment::TrailingSlash, Segment::TrailingSlash) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => write!(f, "/{}", text),
            Segment::Single(name) => write!(f, "/{{{}}}", name),
            Segment::Multi(Some(name)) => write!(f, "/{{{}{}}}", name, MULTI_SUFFIX),
            Segment::Multi(None) => write!(f, "/{{{}}}", MULTI_SUFFIX),
            Segment::TrailingSlash => f.write_str("/"),
        }
    }
}

/// A parsed route pattern.
///
/// Equality is structural: two patterns are equal when their segments have
/// the same shape, regardless of wildcard names or the human-readable name
/// attached to them.
#[derive(Debug, Clone, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
    name: Option<String>,
}

impl Pattern {
    /// Parse a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first syntax problem found.
    pub fn parse(pattern: &str) -> Result<Self, ParseError> {
        if pattern.is_empty() {
            return Err(ParseError::Empty);
        }
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| ParseError::MissingLeadingSlash(pattern.to_string()))?;

        let parts: Vec<&str> = rest.split('/').collect();
        let last = parts.len() - 1;
        let mut segments: Vec<Segment> = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            match segments.last() {
                // `{$}/` is the same as `{$}`
                Some(Segment::TrailingSlash) if part.is_empty() && i == last => continue,
                Some(Segment::Multi(_)) => {
                    return Err(ParseError::MultiNotFinal(pattern.to_string()))
                }
                Some(Segment::TrailingSlash) => {
                    return Err(ParseError::TrailingSlashNotFinal(pattern.to_string()))
                }
                _ => {}
            }

            if part.is_empty() {
                if i == last {
                    segments.push(Segment::TrailingSlash);
                    continue;
                }
                return Err(ParseError::EmptySegment(pattern.to_string()));
            }

            let segment = parse_segment(pattern, part)?;
            if let Some(name) = segment.wildcard_name() {
                let taken = segments
                    .iter()
                    .any(|s| s.wildcard_name() == Some(name));
                if taken {
                    return Err(ParseError::DuplicateName {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            segments,
            name: None,
        })
    }

    /// Attach a human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The human-readable name, if one was attached.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The parsed segments, in path order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Wildcard names in declaration order. Anonymous `{...}` yields `None`.
    pub fn wildcard_names(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.segments
            .iter()
            .filter(|s| s.is_wildcard())
            .map(Segment::wildcard_name)
    }

    /// Returns `true` if the pattern ends in a multi-segment wildcard.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_multi)
    }

    /// Returns `true` if the pattern ends in `{$}`.
    #[must_use]
    pub fn ends_with_slash(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::TrailingSlash))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.same_shape(b))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, ParseError> {
    let malformed = || ParseError::MalformedWildcard {
        pattern: pattern.to_string(),
        segment: part.to_string(),
    };

    if !part.contains(['{', '}']) {
        return Ok(Segment::Literal(part.to_string()));
    }

    let body = part
        .strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
        .ok_or_else(malformed)?;
    if body.contains(['{', '}']) {
        return Err(malformed());
    }

    if body == TRAILING_SLASH_MARKER {
        return Ok(Segment::TrailingSlash);
    }

    if let Some(name) = body.strip_suffix(MULTI_SUFFIX) {
        if name.is_empty() {
            return Ok(Segment::Multi(None));
        }
        validate_name(pattern, name)?;
        return Ok(Segment::Multi(Some(name.to_string())));
    }

    validate_name(pattern, body)?;
    Ok(Segment::Single(body.to_string()))
}

/// Validate a wildcard name: letters, digits and `_`, not starting with a digit.
fn validate_name(pattern: &str, name: &str) -> Result<(), ParseError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ParseError::InvalidName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        })
    }
}
