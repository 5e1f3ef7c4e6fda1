//! Vessel registry and plate-well geometry.
//!
//! # Responsibility
//! - Catalog named plate formats and their shapes.
//! - Map well ids to grid positions and back.
//! - Register experiment vessels rebuilt from vessel-prefixed tags.
//!
//! # Invariants
//! - Vessel ids (`type` + `instance`) are unique within one registry.
//! - Well ids follow `{row letter}{column:02}` with a 52-letter row alphabet.

pub mod design;
pub mod format;

pub use design::{
    col_labels, position_for, row_labels, well_id_at, well_ids, PlateDesign, PlateError,
    PlateResult, ShapeSpec, Vessel, VesselType, ROW_ALPHABET,
};
pub use format::{format_names_ordered, shape_for_format, WellShape};
