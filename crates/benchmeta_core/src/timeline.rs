//! Derived temporal event index.
//!
//! # Responsibility
//! - Hold one event per well-assignment tag: timepoint plus affected wells.
//! - Answer the max-timepoint query the bench time range is driven by.
//!
//! # Invariants
//! - An event exists iff its source tag is bound to a non-empty well list in
//!   the tag store; the store keeps this true via incremental sync.
//! - Overwriting an existing event replaces its well set only; the timepoint
//!   is never recomputed after creation.
//! - Deleting an absent event is a no-op, unlike tag removal.

use crate::model::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One timeline entry derived from a well-assignment tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The owning well-assignment tag.
    pub tag: String,
    /// Integer minutes from experiment start, parsed from the tag.
    pub timepoint: i64,
    /// Plate-well identifiers affected at this timepoint.
    pub well_ids: Vec<Value>,
}

/// Ordered collection of events keyed by their source tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    events: BTreeMap<String, Event>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events exist.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event for the given source tag, when one exists.
    pub fn event(&self, tag: &str) -> Option<&Event> {
        self.events.get(tag)
    }

    /// Inserts a new event for `tag`.
    pub fn add_event(&mut self, tag: &str, timepoint: i64, well_ids: Vec<Value>) {
        self.events.insert(
            tag.to_string(),
            Event {
                tag: tag.to_string(),
                timepoint,
                well_ids,
            },
        );
    }

    /// Replaces the well set of an existing event, leaving its timepoint
    /// untouched. Returns whether an event was present.
    pub fn set_well_ids(&mut self, tag: &str, well_ids: Vec<Value>) -> bool {
        match self.events.get_mut(tag) {
            Some(event) => {
                event.well_ids = well_ids;
                true
            }
            None => false,
        }
    }

    /// Deletes the event for `tag`. Deleting an absent event is a no-op.
    pub fn delete_event(&mut self, tag: &str) {
        self.events.remove(tag);
    }

    /// Removes every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events sorted by timepoint, then by tag for a stable order.
    pub fn events_ordered(&self) -> Vec<&Event> {
        let mut ordered: Vec<&Event> = self.events.values().collect();
        ordered.sort_by(|a, b| a.timepoint.cmp(&b.timepoint).then(a.tag.cmp(&b.tag)));
        ordered
    }

    /// Largest timepoint among live events, or 0 when the timeline is empty.
    pub fn max_timepoint(&self) -> i64 {
        self.events
            .values()
            .map(|event| event.timepoint)
            .max()
            .unwrap_or(0)
    }
}
