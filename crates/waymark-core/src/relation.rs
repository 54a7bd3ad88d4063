//! Pairwise relationships between patterns.
//!
//! Every pattern denotes a set of paths. Two patterns either denote the same
//! set, one contains the other, the sets intersect without containment, or
//! they are disjoint. The router refuses to build when two registered
//! patterns are equivalent or merely overlap, because neither could be
//! preferred over the other at match time.

use crate::pattern::{Pattern, Segment};
use std::fmt;

/// Stand-in value for anonymous wildcards in witness paths.
const ANONYMOUS_WITNESS: &str = "x";

/// How the path sets of two patterns relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// Both patterns match exactly the same paths.
    Equivalent,
    /// The first pattern matches a strict superset of the second.
    MoreGeneral,
    /// The first pattern matches a strict subset of the second.
    MoreSpecific,
    /// Some paths match both, but neither contains the other.
    Overlaps,
    /// No path matches both.
    Disjoint,
}

impl Relationship {
    /// The relationship seen from the other pattern's side.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Relationship::MoreGeneral => Relationship::MoreSpecific,
            Relationship::MoreSpecific => Relationship::MoreGeneral,
            other => other,
        }
    }

    /// Returns `true` if registering both patterns would be ambiguous.
    #[must_use]
    pub fn conflicts(self) -> bool {
        matches!(self, Relationship::Equivalent | Relationship::Overlaps)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationship::Equivalent => "equivalent",
            Relationship::MoreGeneral => "more general",
            Relationship::MoreSpecific => "more specific",
            Relationship::Overlaps => "overlapping",
            Relationship::Disjoint => "disjoint",
        };
        f.write_str(s)
    }
}

/// Classify how `p1` relates to `p2`.
#[must_use]
pub fn classify(p1: &Pattern, p2: &Pattern) -> Relationship {
    let (s1, s2) = (p1.segments(), p2.segments());
    // A wildcard on one side stood opposite a literal on the other.
    let mut wild1_matched_lit2 = false;
    let mut wild2_matched_lit1 = false;

    for i in 0..s1.len().max(s2.len()) {
        match (s1.get(i), s2.get(i)) {
            (Some(Segment::Multi(_)), Some(Segment::Multi(_))) => break,
            (Some(Segment::Multi(_)), Some(_)) => {
                return if wild2_matched_lit1 {
                    Relationship::Overlaps
                } else {
                    Relationship::MoreGeneral
                };
            }
            (Some(_), Some(Segment::Multi(_))) => {
                return if wild1_matched_lit2 {
                    Relationship::Overlaps
                } else {
                    Relationship::MoreSpecific
                };
            }
            (Some(a), Some(b)) => match (a, b) {
                (Segment::TrailingSlash, Segment::TrailingSlash) => {}
                (Segment::TrailingSlash, _) | (_, Segment::TrailingSlash) => {
                    return Relationship::Disjoint
                }
                (Segment::Single(_), Segment::Single(_)) => {}
                (Segment::Single(_), Segment::Literal(_)) => wild1_matched_lit2 = true,
                (Segment::Literal(_), Segment::Single(_)) => wild2_matched_lit1 = true,
                (Segment::Literal(l1), Segment::Literal(l2)) => {
                    if l1 != l2 {
                        return Relationship::Disjoint;
                    }
                }
                // Multi was handled by the outer arms.
                _ => return Relationship::Disjoint,
            },
            // One side ran out. A multi wildcard needs at least the slash
            // in front of it, so it cannot absorb the missing segment.
            _ => return Relationship::Disjoint,
        }
    }

    match (wild1_matched_lit2, wild2_matched_lit1) {
        (false, false) => Relationship::Equivalent,
        (true, false) => Relationship::MoreGeneral,
        (false, true) => Relationship::MoreSpecific,
        (true, true) => Relationship::Overlaps,
    }
}

/// A path matched by both patterns.
///
/// Only meaningful when the patterns are not disjoint.
#[must_use]
pub fn common_path(p1: &Pattern, p2: &Pattern) -> String {
    let (s1, s2) = (p1.segments(), p2.segments());
    let mut path = String::new();

    for (a, b) in s1.iter().zip(s2) {
        // A multi wildcard also accepts whatever the other side needs, so
        // the other side's element is the one both match.
        let element = match (a, b) {
            (_, Segment::Multi(_)) => a,
            (Segment::Multi(_), _) => b,
            _ if a.is_wildcard() => b,
            _ => a,
        };
        write_element(&mut path, element);
    }
    let shared = s1.len().min(s2.len());
    for segment in s1.iter().skip(shared).chain(s2.iter().skip(shared)) {
        write_element(&mut path, segment);
    }

    path
}

/// A path matched by `p1` but not by `p2`.
///
/// Only meaningful when `p1` is more general than `p2`, or the two overlap.
#[must_use]
pub fn difference_path(p1: &Pattern, p2: &Pattern) -> String {
    let (s1, s2) = (p1.segments(), p2.segments());
    let mut path = String::new();

    for (a, b) in s1.iter().zip(s2) {
        match (a, b) {
            (Segment::Multi(_), Segment::Multi(_)) => {
                path.push('/');
                return path;
            }
            (Segment::Multi(name), _) => {
                // An empty final segment escapes everything but `{$}`, which
                // any real segment escapes instead.
                path.push('/');
                if *b == Segment::TrailingSlash {
                    path.push_str(name.as_deref().unwrap_or(ANONYMOUS_WITNESS));
                }
                return path;
            }
            (Segment::Single(name), Segment::Literal(text)) => {
                path.push('/');
                if name == text {
                    path.push_str(text);
                    path.push_str(ANONYMOUS_WITNESS);
                } else {
                    path.push_str(name);
                }
            }
            _ => write_element(&mut path, a),
        }
    }
    if s1.len() > s2.len() {
        for segment in &s1[s2.len()..] {
            write_element(&mut path, segment);
        }
    }

    path
}

/// Append one path element standing in for `segment`.
fn write_element(path: &mut String, segment: &Segment) {
    path.push('/');
    match segment {
        Segment::Literal(text) | Segment::Single(text) => path.push_str(text),
        Segment::Multi(_) | Segment::TrailingSlash => {}
    }
}
