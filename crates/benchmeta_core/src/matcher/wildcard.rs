//! Positional wildcard tag patterns.
//!
//! # Responsibility
//! - Match a pattern like `CellTransfer|*|Wells` against stored tags,
//!   segment by segment.
//!
//! # Invariants
//! - `*` and an absent pattern segment both match any tag segment, including
//!   an absent one; a literal never matches an absent segment.
//! - Comparison runs over the longer of the two segment lists, so
//!   `CellTransfer|*` matches tags of any later segment count.

use crate::model::tag::TAG_SEPARATOR;

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the tag segment at the same position.
    Literal(String),
    /// Matches any segment, present or absent.
    Any,
}

/// A compiled positional wildcard pattern.
///
/// This dialect is not a regex: `*` stands for exactly one segment and
/// carries no sub-segment matching power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    segments: Vec<Segment>,
}

impl WildcardPattern {
    /// Parses a `|`-separated pattern string.
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split(TAG_SEPARATOR)
            .map(|part| {
                if part == "*" {
                    Segment::Any
                } else {
                    Segment::Literal(part.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    /// Whether `tag` matches this pattern, position by position.
    pub fn matches(&self, tag: &str) -> bool {
        let tag_segments: Vec<&str> = tag.split(TAG_SEPARATOR).collect();
        let length = self.segments.len().max(tag_segments.len());
        for position in 0..length {
            match (self.segments.get(position), tag_segments.get(position)) {
                // Pattern exhausted: remaining tag segments are unconstrained.
                (None, Some(_)) => {}
                (Some(Segment::Any), _) => {}
                (Some(Segment::Literal(literal)), Some(subtag)) => {
                    if literal != subtag {
                        return false;
                    }
                }
                // A literal requires a segment to compare against.
                (Some(Segment::Literal(_)), None) => return false,
                (None, None) => {}
            }
        }
        true
    }
}

impl From<&str> for WildcardPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}
