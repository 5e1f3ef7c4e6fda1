//! Tag store and change notification.
//!
//! # Responsibility
//! - Own the flat tag namespace and its derived indices as one unit.
//! - Dispatch subscriber callbacks inline with every mutation.
//!
//! # Invariants
//! - The tag map is the single source of truth; timeline and plate design
//!   are projections and never carry data the map does not imply.
//! - Mutations run to completion, including dispatch, before returning.

pub mod subscribers;
pub mod tag_store;
