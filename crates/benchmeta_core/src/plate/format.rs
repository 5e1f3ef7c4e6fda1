//! Static plate format catalog.
//!
//! # Responsibility
//! - Name the supported well-plate formats and their grid shapes.
//! - Keep a smallest-to-largest ordering for presentation layers.
//!
//! # Invariants
//! - The catalog is fixed at build time; it is never derived from tags.
//! - Every catalog name maps to exactly one shape.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grid shape of a vessel: row count by column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellShape {
    /// Number of rows (letters).
    pub rows: usize,
    /// Number of columns (1-based numbering).
    pub cols: usize,
}

impl WellShape {
    /// Creates a shape from a `(rows, cols)` pair.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of wells.
    pub const fn well_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl From<(usize, usize)> for WellShape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::new(rows, cols)
    }
}

/// Shape used for unstructured vessels (flasks, dishes, coverslips).
pub const FLASK: WellShape = WellShape::new(1, 1);
/// 6-well plate.
pub const P6: WellShape = WellShape::new(2, 3);
/// 12-well plate.
pub const P12: WellShape = WellShape::new(3, 4);
/// 24-well plate.
pub const P24: WellShape = WellShape::new(4, 6);
/// 48-well plate.
pub const P48: WellShape = WellShape::new(6, 8);
/// 96-well plate.
pub const P96: WellShape = WellShape::new(8, 12);
/// 384-well plate.
pub const P384: WellShape = WellShape::new(16, 24);
/// 1536-well plate.
pub const P1536: WellShape = WellShape::new(32, 48);
/// 5600-well CellSpot plate.
pub const P5600: WellShape = WellShape::new(40, 140);

/// Catalog names ordered from smallest to largest format.
const FORMAT_NAMES_ORDERED: [(&str, WellShape); 8] = [
    ("6-Well-(2x3)", P6),
    ("12-Well-(3x4)", P12),
    ("24-Well-(4x6)", P24),
    ("48-Well-(6x8)", P48),
    ("96-Well-(8x12)", P96),
    ("384-Well-(16x24)", P384),
    ("1536-Well-(32x48)", P1536),
    ("5600-Well-(40x140)", P5600),
];

static FORMATS_BY_NAME: Lazy<BTreeMap<&'static str, WellShape>> =
    Lazy::new(|| FORMAT_NAMES_ORDERED.iter().copied().collect());

/// Shape for a catalog format name, or `None` when the name is unknown.
pub fn shape_for_format(name: &str) -> Option<WellShape> {
    FORMATS_BY_NAME.get(name).copied()
}

/// Catalog names in presentation order (smallest format first).
pub fn format_names_ordered() -> Vec<&'static str> {
    FORMAT_NAMES_ORDERED.iter().map(|(name, _)| *name).collect()
}
