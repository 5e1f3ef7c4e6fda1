//! Vessel registry and well-position arithmetic.
//!
//! # Responsibility
//! - Register one `Vessel` per physical plate/flask/dish/coverslip instance.
//! - Convert between well ids and zero-based grid positions.
//!
//! # Invariants
//! - `vessel_id = vessel_type + instance` is unique in one registry.
//! - Well ids are row-major: `A01`, `A02`, ... then `B01`, ...
//! - Row letters come from a 52-symbol alphabet (A-Z then a-z), so shapes up
//!   to 52 rows are addressable.
//! - The registry is rebuilt wholesale on clear/load; individual tag edits
//!   never patch it.

use crate::model::value::Value;
use crate::plate::format::{shape_for_format, WellShape};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Row letters, uppercase then lowercase.
pub const ROW_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Result type for plate/vessel APIs.
pub type PlateResult<T> = Result<T, PlateError>;

/// Error for vessel registration and well arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlateError {
    /// A format name was not found in the static catalog.
    UnknownFormat(String),
    /// A row/column position lies outside the shape.
    OutOfRangePosition {
        row: usize,
        col: usize,
        shape: WellShape,
    },
    /// A well id does not parse or lies outside the shape.
    OutOfRangeWell { well_id: String, shape: WellShape },
    /// No vessel is registered under the given id.
    UnknownVessel(String),
    /// The given string is not a vessel type.
    UnknownVesselType(String),
}

impl Display for PlateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormat(name) => write!(f, "unknown plate format `{name}`"),
            Self::OutOfRangePosition { row, col, shape } => write!(
                f,
                "position ({row}, {col}) outside shape {}x{}",
                shape.rows, shape.cols
            ),
            Self::OutOfRangeWell { well_id, shape } => write!(
                f,
                "well id `{well_id}` invalid for shape {}x{}",
                shape.rows, shape.cols
            ),
            Self::UnknownVessel(vessel_id) => write!(f, "unknown vessel `{vessel_id}`"),
            Self::UnknownVesselType(raw) => write!(f, "unknown vessel type `{raw}`"),
        }
    }
}

impl Error for PlateError {}

/// Physical vessel category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VesselType {
    /// Multi-well plate.
    Plate,
    /// Culture flask.
    Flask,
    /// Culture dish.
    Dish,
    /// Coverslip.
    Coverslip,
}

impl VesselType {
    /// Every vessel type, in registry scan order.
    pub const ALL: [Self; 4] = [Self::Plate, Self::Flask, Self::Dish, Self::Coverslip];

    /// Canonical tag spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plate => "Plate",
            Self::Flask => "Flask",
            Self::Dish => "Dish",
            Self::Coverslip => "Coverslip",
        }
    }
}

impl Display for VesselType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VesselType {
    type Err = PlateError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| PlateError::UnknownVesselType(raw.to_string()))
    }
}

/// Shape given either literally or by catalog format name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeSpec {
    /// Literal `(rows, cols)` shape.
    Literal(WellShape),
    /// Name to resolve against the static format catalog.
    Named(String),
}

impl ShapeSpec {
    /// Resolves this spec against the catalog.
    pub fn resolve(&self) -> PlateResult<WellShape> {
        match self {
            Self::Literal(shape) => Ok(*shape),
            Self::Named(name) => {
                shape_for_format(name).ok_or_else(|| PlateError::UnknownFormat(name.clone()))
            }
        }
    }
}

impl From<WellShape> for ShapeSpec {
    fn from(shape: WellShape) -> Self {
        Self::Literal(shape)
    }
}

impl From<&str> for ShapeSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// One physical vessel instance with shape, group and free-form attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    /// Vessel category.
    pub vessel_type: VesselType,
    /// Instance id, a small decimal string allocated by the store.
    pub instance: String,
    /// Grid shape.
    pub shape: WellShape,
    /// Optional presentation group label.
    pub group: Option<String>,
    /// Free-form named attributes carried from tags.
    pub attributes: BTreeMap<String, Value>,
}

impl Vessel {
    /// Registry key: vessel type concatenated with instance id.
    pub fn vessel_id(&self) -> String {
        format!("{}{}", self.vessel_type, self.instance)
    }

    /// Sets one free-form attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }
}

/// Registry of experiment vessels keyed by vessel id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlateDesign {
    vessels: BTreeMap<String, Vessel>,
}

impl PlateDesign {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every vessel.
    pub fn clear(&mut self) {
        self.vessels.clear();
    }

    /// Number of registered vessels.
    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    /// Whether no vessels are registered.
    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }

    /// Registers a vessel, resolving named formats against the catalog.
    ///
    /// Overwrites any previous vessel with the same id; callers allocate
    /// fresh instance ids through the store to avoid collisions.
    pub fn add_vessel(
        &mut self,
        vessel_type: VesselType,
        instance: impl Into<String>,
        shape: ShapeSpec,
        group: Option<String>,
        attributes: BTreeMap<String, Value>,
    ) -> PlateResult<String> {
        let vessel = Vessel {
            vessel_type,
            instance: instance.into(),
            shape: shape.resolve()?,
            group,
            attributes,
        };
        let vessel_id = vessel.vessel_id();
        self.vessels.insert(vessel_id.clone(), vessel);
        Ok(vessel_id)
    }

    /// Replaces the shape of a registered vessel.
    pub fn set_shape(&mut self, vessel_id: &str, shape: ShapeSpec) -> PlateResult<()> {
        let resolved = shape.resolve()?;
        let vessel = self
            .vessels
            .get_mut(vessel_id)
            .ok_or_else(|| PlateError::UnknownVessel(vessel_id.to_string()))?;
        vessel.shape = resolved;
        Ok(())
    }

    /// All registered vessel ids, sorted.
    pub fn vessel_ids(&self) -> Vec<String> {
        self.vessels.keys().cloned().collect()
    }

    /// Vessel id for a (type, instance) pair, when registered.
    pub fn vessel_id_for(&self, vessel_type: VesselType, instance: &str) -> Option<String> {
        self.vessels
            .values()
            .find(|vessel| vessel.vessel_type == vessel_type && vessel.instance == instance)
            .map(Vessel::vessel_id)
    }

    /// Vessel by id.
    pub fn vessel(&self, vessel_id: &str) -> PlateResult<&Vessel> {
        self.vessels
            .get(vessel_id)
            .ok_or_else(|| PlateError::UnknownVessel(vessel_id.to_string()))
    }

    /// Group label of a vessel.
    pub fn group(&self, vessel_id: &str) -> PlateResult<Option<&str>> {
        Ok(self.vessel(vessel_id)?.group.as_deref())
    }

    /// Shape of a vessel.
    pub fn shape(&self, vessel_id: &str) -> PlateResult<WellShape> {
        Ok(self.vessel(vessel_id)?.shape)
    }

    /// Every `(vessel_id, well_id)` pair across all registered vessels.
    pub fn all_plate_well_ids(&self) -> Vec<(String, String)> {
        self.vessels
            .iter()
            .flat_map(|(vessel_id, vessel)| {
                well_ids(vessel.shape)
                    .into_iter()
                    .map(move |well_id| (vessel_id.clone(), well_id))
            })
            .collect()
    }
}

/// Ordered well ids for a shape, row-major with 1-based columns.
///
/// `well_ids(P96)` is 96 entries from `A01` to `H12`.
pub fn well_ids(shape: WellShape) -> Vec<String> {
    ROW_ALPHABET
        .chars()
        .take(shape.rows)
        .flat_map(|row| (1..=shape.cols).map(move |col| format!("{row}{col:02}")))
        .collect()
}

/// Row labels for a shape: one letter per row.
pub fn row_labels(shape: WellShape) -> Vec<String> {
    ROW_ALPHABET
        .chars()
        .take(shape.rows)
        .map(|row| row.to_string())
        .collect()
}

/// Column labels for a shape: zero-padded 1-based numbers.
pub fn col_labels(shape: WellShape) -> Vec<String> {
    (1..=shape.cols).map(|col| format!("{col:02}")).collect()
}

/// Well id at a zero-based (row, col) position.
pub fn well_id_at(shape: WellShape, row: usize, col: usize) -> PlateResult<String> {
    if row >= shape.rows || col >= shape.cols {
        return Err(PlateError::OutOfRangePosition { row, col, shape });
    }
    let letter = ROW_ALPHABET
        .chars()
        .nth(row)
        .ok_or(PlateError::OutOfRangePosition { row, col, shape })?;
    Ok(format!("{letter}{:02}", col + 1))
}

/// Zero-based (row, col) position of a well id within a shape.
///
/// e.g. `position_for(P96, "A02")` → `(0, 1)`.
pub fn position_for(shape: WellShape, well_id: &str) -> PlateResult<(usize, usize)> {
    let out_of_range = || PlateError::OutOfRangeWell {
        well_id: well_id.to_string(),
        shape,
    };
    let mut chars = well_id.chars();
    let letter = chars.next().ok_or_else(out_of_range)?;
    let row = ROW_ALPHABET.find(letter).ok_or_else(out_of_range)?;
    let col_number: usize = chars.as_str().parse().map_err(|_| out_of_range())?;
    if col_number == 0 {
        return Err(out_of_range());
    }
    let col = col_number - 1;
    if row >= shape.rows || col >= shape.cols {
        return Err(out_of_range());
    }
    Ok((row, col))
}
