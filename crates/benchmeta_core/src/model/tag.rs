//! Tag grammar helpers.
//!
//! # Responsibility
//! - Define the pipe-delimited positional tag grammar shared by every layer.
//! - Provide non-panicking accessors for the conventional segment positions.
//!
//! # Invariants
//! - Tags are free-form strings; structure is conventional, never enforced.
//! - Segment positions are fixed: event class | event type | attribute |
//!   instance | timepoint | well.
//! - A well-assignment tag is recognized by its attribute segment, matched
//!   with the anchored subtag dialect (so `Wells` qualifies, as written by
//!   real producers).

use crate::matcher::subtag::{anchored_match, compile_anchored, subtag_matchstring};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Segment separator for every tag.
pub const TAG_SEPARATOR: char = '|';

/// Event classes whose tags are eligible to appear on the timeline.
pub const TEMPORAL_CLASSES: [&str; 5] = [
    "CellTransfer",
    "Perturbation",
    "Labeling",
    "AddProcess",
    "DataAcquis",
];

/// Attribute names that carry mechanism, not experiment data.
///
/// Excluded from protocol attribute dictionaries.
pub const STRUCTURAL_ATTRIBUTES: [&str; 4] =
    ["Wells", "EventTimepoint", "Images", "OriginWells"];

static WELL_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    compile_anchored(&subtag_matchstring(2, "Well")).expect("valid well-assignment regex")
});

/// Result type for tag accessor APIs.
pub type TagResult<T> = Result<T, TagError>;

/// Error for tags that lack a segment an accessor requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The tag has no segment at the requested position.
    MissingSegment { tag: String, position: usize },
    /// The timepoint segment is present but not an integer.
    InvalidTimepoint { tag: String, value: String },
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSegment { tag, position } => {
                write!(f, "tag `{tag}` has no segment at position {position}")
            }
            Self::InvalidTimepoint { tag, value } => {
                write!(f, "tag `{tag}` carries non-integer timepoint `{value}`")
            }
        }
    }
}

impl Error for TagError {}

/// Splits a tag into its positional segments.
pub fn segments(tag: &str) -> Vec<&str> {
    tag.split(TAG_SEPARATOR).collect()
}

/// Returns the segment at `position`, or a `MissingSegment` error.
pub fn segment(tag: &str, position: usize) -> TagResult<&str> {
    tag.split(TAG_SEPARATOR)
        .nth(position)
        .ok_or_else(|| TagError::MissingSegment {
            tag: tag.to_string(),
            position,
        })
}

/// Returns the first `n` segments rejoined, e.g. the 3-segment stump that
/// prefixes one attribute family.
pub fn stump(tag: &str, n: usize) -> String {
    tag.split(TAG_SEPARATOR)
        .take(n)
        .collect::<Vec<_>>()
        .join("|")
}

/// Attribute name segment (position 2).
pub fn attribute(tag: &str) -> TagResult<&str> {
    segment(tag, 2)
}

/// Instance id segment (position 3).
pub fn instance(tag: &str) -> TagResult<&str> {
    segment(tag, 3)
}

/// Timepoint segment (position 4) parsed as integer minutes.
pub fn timepoint(tag: &str) -> TagResult<i64> {
    let raw = segment(tag, 4)?;
    raw.parse::<i64>().map_err(|_| TagError::InvalidTimepoint {
        tag: tag.to_string(),
        value: raw.to_string(),
    })
}

/// Well id segment (position 5), carried by image tags of the form
/// `DataAcquis|<type>|Images|<inst>|<timepoint>|<well>`.
pub fn well(tag: &str) -> TagResult<&str> {
    segment(tag, 5)
}

/// The (event class, event type, instance) triple naming one protocol
/// instance, rejoined as `class|type|instance`.
///
/// e.g. `protocol("CellTransfer|Seed|Density|1")` → `"CellTransfer|Seed|1"`.
pub fn protocol(tag: &str) -> TagResult<String> {
    let inst = instance(tag)?;
    Ok(format!("{}|{inst}", stump(tag, 2)))
}

/// Whether the tag assigns wells to a protocol instance and therefore drives
/// timeline membership.
pub fn is_well_assignment(tag: &str) -> bool {
    anchored_match(&WELL_ASSIGNMENT_RE, tag)
}

/// Whether the tag's event class is one of the closed temporal set.
pub fn is_temporal(tag: &str) -> bool {
    tag.split(TAG_SEPARATOR)
        .next()
        .is_some_and(|class| TEMPORAL_CLASSES.contains(&class))
}

/// Formats integer minutes as an `h:mm` display string.
pub fn format_minutes(timepoint: i64) -> String {
    let hours = timepoint / 60;
    let mins = timepoint - 60 * hours;
    format!("{hours}:{mins:02}")
}
