//! Domain model shared by every layer of the store.
//!
//! # Responsibility
//! - Define the pipe-delimited tag grammar and its segment conventions.
//! - Define the closed typed value set that tags may be bound to.
//!
//! # Invariants
//! - Tag structure is conventional; accessors fail softly, never panic.
//! - Values outside `Value` are never stored or persisted.

pub mod tag;
pub mod value;
