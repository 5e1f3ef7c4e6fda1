//! The experiment tag store.
//!
//! # Responsibility
//! - Map tag strings to typed values with set/get/remove semantics.
//! - Keep the timeline in sync on every well-assignment mutation.
//! - Run subscriber dispatch inline before each mutating call returns.
//!
//! # Invariants
//! - Removing an absent tag is a caller error, never a guarded no-op.
//! - Subscribers observe a fully-updated store; reentrant mutation from
//!   inside a callback is rejected with `ReentrantMutation`.
//! - The plate design registry is only touched by `clear` and full rebuild;
//!   individual field edits never patch it.

use crate::matcher::subtag::MatcherError;
use crate::matcher::wildcard::WildcardPattern;
use crate::model::tag::{self, TagError};
use crate::model::value::Value;
use crate::plate::design::{PlateDesign, PlateError, ShapeSpec, VesselType};
use crate::store::subscribers::{SubscriberCallback, SubscriberId, SubscriberRegistry};
use crate::timeline::Timeline;
use log::{debug, info};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Exclusive upper bound for instance id allocation. Running past it means
/// the experiment description is broken, not that ids should wrap.
pub const INSTANCE_ID_BOUND: u64 = 100_000;

/// Tag prefix under which vessels are described, per vessel type.
pub const VESSEL_TAG_PREFIX: &str = "ExptVessel";

/// Result type for store APIs.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error for tag store operations.
#[derive(Debug)]
pub enum StoreError {
    /// `remove_field` was called for a tag that is not present.
    MissingTag(String),
    /// A mutation was attempted from inside subscriber dispatch.
    ReentrantMutation { operation: &'static str },
    /// No free instance id below the search bound.
    InstanceIdExhausted { prefix: String },
    /// A subscription pattern did not compile.
    Pattern(MatcherError),
    /// A tag lacked or mangled a segment an operation required.
    Tag(TagError),
    /// Vessel registration failed during a plate design rebuild.
    Plate(PlateError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTag(tag) => write!(f, "tag not present: `{tag}`"),
            Self::ReentrantMutation { operation } => {
                write!(f, "`{operation}` called from inside subscriber dispatch")
            }
            Self::InstanceIdExhausted { prefix } => write!(
                f,
                "no free instance id below {INSTANCE_ID_BOUND} for prefix `{prefix}`"
            ),
            Self::Pattern(err) => write!(f, "{err}"),
            Self::Tag(err) => write!(f, "{err}"),
            Self::Plate(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pattern(err) => Some(err),
            Self::Tag(err) => Some(err),
            Self::Plate(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MatcherError> for StoreError {
    fn from(err: MatcherError) -> Self {
        Self::Pattern(err)
    }
}

impl From<TagError> for StoreError {
    fn from(err: TagError) -> Self {
        Self::Tag(err)
    }
}

impl From<PlateError> for StoreError {
    fn from(err: PlateError) -> Self {
        Self::Plate(err)
    }
}

/// Hierarchical tag-addressed metadata store with derived indices and
/// inline change notification.
///
/// Single-threaded by design: every mutation, including timeline sync and
/// subscriber dispatch, completes before the call returns. The store, its
/// timeline and its plate design form one logical unit of shared state.
#[derive(Default)]
pub struct TagStore {
    fields: RefCell<BTreeMap<String, Value>>,
    timeline: RefCell<Timeline>,
    plate_design: RefCell<PlateDesign>,
    subscribers: RefCell<SubscriberRegistry>,
    in_dispatch: Cell<bool>,
}

impl TagStore {
    /// Creates an empty store with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tags.
    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    /// Whether no tags are stored.
    pub fn is_empty(&self) -> bool {
        self.fields.borrow().is_empty()
    }

    /// Inserts or overwrites `tag → value`.
    ///
    /// Well-assignment tags sync the timeline before notification, so
    /// subscribers always observe consistent derived state.
    ///
    /// # Errors
    /// - `ReentrantMutation` when called from inside dispatch.
    /// - `Tag` when a well-assignment tag carries a non-integer timepoint.
    pub fn set_field(&self, tag: &str, value: Value, notify: bool) -> StoreResult<()> {
        self.ensure_not_dispatching("set_field")?;
        debug!("event=set_field module=store tag={tag} value={value}");
        self.fields.borrow_mut().insert(tag.to_string(), value);
        if tag::is_well_assignment(tag) {
            self.sync_timeline(tag)?;
        }
        if notify {
            self.dispatch(tag);
        }
        Ok(())
    }

    /// Value bound to `tag`, when present.
    pub fn get_field(&self, tag: &str) -> Option<Value> {
        self.fields.borrow().get(tag).cloned()
    }

    /// Value bound to `tag`, or `default` when absent.
    pub fn get_field_or(&self, tag: &str, default: Value) -> Value {
        self.get_field(tag).unwrap_or(default)
    }

    /// Deletes `tag` from the store.
    ///
    /// # Errors
    /// - `MissingTag` when `tag` is not present; existence is a caller
    ///   contract here, unlike event deletion in the timeline.
    /// - `ReentrantMutation` when called from inside dispatch.
    pub fn remove_field(&self, tag: &str, notify: bool) -> StoreResult<()> {
        self.ensure_not_dispatching("remove_field")?;
        if self.fields.borrow_mut().remove(tag).is_none() {
            return Err(StoreError::MissingTag(tag.to_string()));
        }
        debug!("event=remove_field module=store tag={tag}");
        if tag::is_well_assignment(tag) {
            self.sync_timeline(tag)?;
        }
        if notify {
            self.dispatch(tag);
        }
        Ok(())
    }

    /// All stored tags in lexicographic order.
    pub fn tags(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    /// Snapshot of every `(tag, value)` pair in lexicographic tag order.
    pub fn fields_snapshot(&self) -> Vec<(String, Value)> {
        self.fields
            .borrow()
            .iter()
            .map(|(tag, value)| (tag.clone(), value.clone()))
            .collect()
    }

    /// Tags beginning with `prefix`, optionally narrowed to one instance id.
    pub fn field_tags(&self, prefix: Option<&str>, instance: Option<&str>) -> Vec<String> {
        self.fields
            .borrow()
            .keys()
            .filter(|stored| prefix.is_none_or(|p| stored.starts_with(p)))
            .filter(|stored| instance.is_none_or(|i| tag::instance(stored) == Ok(i)))
            .cloned()
            .collect()
    }

    /// Tags matching a positional wildcard pattern, e.g. `CellTransfer|*`.
    pub fn matching_tags(&self, pattern: &str) -> Vec<String> {
        let compiled = WildcardPattern::new(pattern);
        self.fields
            .borrow()
            .keys()
            .filter(|stored| compiled.matches(stored))
            .cloned()
            .collect()
    }

    /// Distinct instance ids among tags beginning with `prefix`.
    pub fn field_instances(&self, prefix: &str) -> Vec<String> {
        self.distinct_segment(prefix, 3)
    }

    /// Distinct attribute names among tags beginning with `prefix`.
    pub fn attribute_names(&self, prefix: &str) -> Vec<String> {
        self.distinct_segment(prefix, 2)
    }

    /// Distinct event types among tags beginning with `prefix`.
    pub fn event_types(&self, prefix: &str) -> Vec<String> {
        self.distinct_segment(prefix, 1)
    }

    /// Distinct event classes among tags beginning with `prefix`.
    pub fn event_classes(&self, prefix: &str) -> Vec<String> {
        self.distinct_segment(prefix, 0)
    }

    /// Attribute name → value map for one protocol instance, excluding the
    /// structural attributes that carry mechanism rather than data.
    ///
    /// e.g. `attribute_dict("CellTransfer|Seed|1")` →
    /// `{"SeedingDensity": 12, "MediumUsed": 'agar'}`.
    pub fn attribute_dict(&self, protocol: &str) -> BTreeMap<String, Value> {
        let pattern = match protocol.rsplit_once('|') {
            Some((head, instance)) => format!("{head}|*|{instance}"),
            None => protocol.to_string(),
        };
        let mut attributes = BTreeMap::new();
        for matched in self.matching_tags(&pattern) {
            let Ok(attribute) = tag::attribute(&matched) else {
                continue;
            };
            if tag::STRUCTURAL_ATTRIBUTES.contains(&attribute) {
                continue;
            }
            if let Some(value) = self.get_field(&matched) {
                attributes.insert(attribute.to_string(), value);
            }
        }
        attributes
    }

    /// Smallest positive integer (as a string) not yet used as an instance
    /// id under `prefix`. Returns `"1"` when no instances exist.
    ///
    /// # Errors
    /// - `InstanceIdExhausted` when every id below the bound is taken.
    pub fn next_instance_id(&self, prefix: &str) -> StoreResult<String> {
        let taken: BTreeSet<String> = self.field_instances(prefix).into_iter().collect();
        (1..INSTANCE_ID_BOUND)
            .map(|candidate| candidate.to_string())
            .find(|candidate| !taken.contains(candidate))
            .ok_or_else(|| StoreError::InstanceIdExhausted {
                prefix: prefix.to_string(),
            })
    }

    /// Every tag whose event class belongs to the closed temporal set.
    pub fn action_tags(&self) -> Vec<String> {
        self.fields
            .borrow()
            .keys()
            .filter(|stored| tag::is_temporal(stored))
            .cloned()
            .collect()
    }

    /// Resets the tag map, timeline and plate design, then notifies every
    /// subscriber once with a null payload.
    pub fn clear(&self) -> StoreResult<()> {
        self.ensure_not_dispatching("clear")?;
        info!("event=clear module=store tags={}", self.len());
        self.fields.borrow_mut().clear();
        self.timeline.borrow_mut().clear();
        self.plate_design.borrow_mut().clear();
        let callbacks = self.subscribers.borrow().all_callbacks();
        self.run_callbacks(&callbacks, None);
        Ok(())
    }

    /// Registers `callback` for tags matching the anchored regex `pattern`.
    pub fn subscribe(
        &self,
        pattern: &str,
        callback: SubscriberCallback,
    ) -> StoreResult<SubscriberId> {
        Ok(self.subscribers.borrow_mut().subscribe(pattern, callback)?)
    }

    /// Removes one subscription. Must be called before the callback's
    /// captured state becomes invalid.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers.borrow_mut().unsubscribe(id)
    }

    /// Dispatches a change notification for `tag` to matching subscribers.
    ///
    /// Used by the persistence codec for its post-load refresh pass.
    pub fn notify(&self, tag: &str) {
        self.dispatch(tag);
    }

    /// Read access to the derived timeline.
    pub fn timeline(&self) -> Ref<'_, Timeline> {
        self.timeline.borrow()
    }

    /// Largest event timepoint, or 0 when the timeline is empty.
    pub fn max_timepoint(&self) -> i64 {
        self.timeline.borrow().max_timepoint()
    }

    /// Read access to the vessel registry.
    pub fn plate_design(&self) -> Ref<'_, PlateDesign> {
        self.plate_design.borrow()
    }

    /// Write access to the vessel registry.
    ///
    /// The registry is populated independently of field edits; mutating it
    /// here does not touch the tag map.
    pub fn plate_design_mut(&self) -> RefMut<'_, PlateDesign> {
        self.plate_design.borrow_mut()
    }

    /// Rebuilds the vessel registry from scratch by scanning
    /// `ExptVessel|{type}` tags for every vessel type.
    ///
    /// Shape comes from the `Design` attribute, a literal `(rows, cols)`
    /// pair or a catalog format name, with a `(1, 1)` fallback; the group
    /// label comes from `GroupName`. Remaining attributes are carried onto
    /// the vessel as free-form fields.
    pub fn rebuild_plate_design(&self) -> StoreResult<()> {
        self.plate_design.borrow_mut().clear();
        for vessel_type in VesselType::ALL {
            let prefix = format!("{VESSEL_TAG_PREFIX}|{vessel_type}");
            for instance in self.field_instances(&prefix) {
                let mut attributes = self.attribute_dict(&format!("{prefix}|{instance}"));
                let shape = match attributes.remove("Design") {
                    Some(value) => shape_spec_for(&value),
                    None => ShapeSpec::Literal((1, 1).into()),
                };
                let group = attributes
                    .remove("GroupName")
                    .and_then(|value| value.as_str().map(str::to_string));
                self.plate_design.borrow_mut().add_vessel(
                    vessel_type,
                    instance,
                    shape,
                    group,
                    attributes,
                )?;
            }
        }
        info!(
            "event=rebuild_plate_design module=store vessels={}",
            self.plate_design.borrow().len()
        );
        Ok(())
    }

    fn distinct_segment(&self, prefix: &str, position: usize) -> Vec<String> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for stored in self.fields.borrow().keys() {
            if !stored.starts_with(prefix) {
                continue;
            }
            if let Ok(segment) = tag::segment(stored, position) {
                seen.insert(segment.to_string());
            }
        }
        seen.into_iter().collect()
    }

    /// Brings the timeline event for `well_tag` in line with the store.
    ///
    /// Empty or absent well list deletes the event (a no-op when the event
    /// is already gone); an existing event keeps its timepoint and only has
    /// its well set replaced.
    fn sync_timeline(&self, well_tag: &str) -> StoreResult<()> {
        match self.get_field(well_tag) {
            Some(value) if !value.is_empty_sequence() => {
                let well_ids = match value.as_items() {
                    Some(items) => items.to_vec(),
                    // A bare well id counts as a one-element assignment.
                    None => vec![value],
                };
                let mut timeline = self.timeline.borrow_mut();
                if !timeline.set_well_ids(well_tag, well_ids.clone()) {
                    let timepoint = tag::timepoint(well_tag)?;
                    timeline.add_event(well_tag, timepoint, well_ids);
                }
            }
            _ => self.timeline.borrow_mut().delete_event(well_tag),
        }
        Ok(())
    }

    fn dispatch(&self, tag: &str) {
        let callbacks = self.subscribers.borrow().callbacks_matching(tag);
        self.run_callbacks(&callbacks, Some(tag));
    }

    fn run_callbacks(&self, callbacks: &[SubscriberCallback], payload: Option<&str>) {
        // Nested dispatch (a callback calling `notify`) must not clear the
        // guard for the frame that is still running.
        let enclosing = self.in_dispatch.get();
        self.in_dispatch.set(true);
        for callback in callbacks {
            callback(payload);
        }
        self.in_dispatch.set(enclosing);
    }

    fn ensure_not_dispatching(&self, operation: &'static str) -> StoreResult<()> {
        if self.in_dispatch.get() {
            return Err(StoreError::ReentrantMutation { operation });
        }
        Ok(())
    }
}

/// Maps a stored `Design` attribute to a shape spec.
fn shape_spec_for(value: &Value) -> ShapeSpec {
    if let Some((rows, cols)) = value.as_shape_pair() {
        return ShapeSpec::Literal((rows, cols).into());
    }
    match value.as_str() {
        Some(name) => ShapeSpec::Named(name.to_string()),
        None => ShapeSpec::Literal((1, 1).into()),
    }
}
