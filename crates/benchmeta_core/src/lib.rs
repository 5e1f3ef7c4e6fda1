//! Core experiment metadata store for benchmeta.
//! This crate is the single source of truth for tag, timeline and vessel
//! invariants.

pub mod codec;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod plate;
pub mod store;
pub mod timeline;

pub use codec::{load, load_from_path, parse_literal, save, save_to_path, CodecError, CodecResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use matcher::{compile_anchored, subtag_matchstring, MatcherError, WildcardPattern};
pub use model::tag::{TagError, TagResult, STRUCTURAL_ATTRIBUTES, TEMPORAL_CLASSES};
pub use model::value::Value;
pub use plate::{
    PlateDesign, PlateError, PlateResult, ShapeSpec, Vessel, VesselType, WellShape,
};
pub use store::subscribers::{SubscriberCallback, SubscriberId, SubscriberRegistry};
pub use store::tag_store::{StoreError, StoreResult, TagStore, INSTANCE_ID_BOUND};
pub use timeline::{Event, Timeline};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
