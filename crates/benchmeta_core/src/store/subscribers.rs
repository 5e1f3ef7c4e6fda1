//! Change-notification subscriber registry.
//!
//! # Responsibility
//! - Associate anchored regex patterns with ordered callback lists.
//! - Select the callbacks to invoke for one mutated tag.
//!
//! # Invariants
//! - Within one pattern, callbacks run in subscription order; order across
//!   patterns is unspecified.
//! - A pattern that does not compile is rejected at subscribe time.
//! - Callers must unsubscribe before a callback's captured state goes away;
//!   the registry performs no liveness detection.

use crate::matcher::subtag::{anchored_match, compile_anchored, MatcherError};
use regex::Regex;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Notification callback. Receives `Some(tag)` for one mutated tag, or
/// `None` when the whole store was reset.
pub type SubscriberCallback = Rc<dyn Fn(Option<&str>)>;

/// Token identifying one subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriberId(u64);

struct PatternEntry {
    regex: Regex,
    callbacks: Vec<(SubscriberId, SubscriberCallback)>,
}

/// Registry mapping match patterns to callback lists.
#[derive(Default)]
pub struct SubscriberRegistry {
    entries: BTreeMap<String, PatternEntry>,
    next_id: u64,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions across all patterns.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|entry| entry.callbacks.len())
            .sum()
    }

    /// Whether no subscriptions exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers `callback` under the given anchored regex pattern.
    ///
    /// The same pattern may carry several callbacks; they are invoked in
    /// subscription order.
    pub fn subscribe(
        &mut self,
        pattern: &str,
        callback: SubscriberCallback,
    ) -> Result<SubscriberId, MatcherError> {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        match self.entries.get_mut(pattern) {
            Some(entry) => entry.callbacks.push((id, callback)),
            None => {
                let regex = compile_anchored(pattern)?;
                self.entries.insert(
                    pattern.to_string(),
                    PatternEntry {
                        regex,
                        callbacks: vec![(id, callback)],
                    },
                );
            }
        }
        Ok(id)
    }

    /// Removes one subscription. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let mut removed = false;
        self.entries.retain(|_, entry| {
            let before = entry.callbacks.len();
            entry.callbacks.retain(|(entry_id, _)| *entry_id != id);
            removed |= entry.callbacks.len() != before;
            !entry.callbacks.is_empty()
        });
        removed
    }

    /// Callbacks whose pattern matches `tag`, cloned out so dispatch never
    /// holds a borrow of the registry.
    pub fn callbacks_matching(&self, tag: &str) -> Vec<SubscriberCallback> {
        self.entries
            .values()
            .filter(|entry| anchored_match(&entry.regex, tag))
            .flat_map(|entry| entry.callbacks.iter().map(|(_, cb)| Rc::clone(cb)))
            .collect()
    }

    /// Every registered callback, for the full-reset notification.
    pub fn all_callbacks(&self) -> Vec<SubscriberCallback> {
        self.entries
            .values()
            .flat_map(|entry| entry.callbacks.iter().map(|(_, cb)| Rc::clone(cb)))
            .collect()
    }
}
