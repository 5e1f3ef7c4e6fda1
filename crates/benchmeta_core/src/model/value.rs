//! Typed field value model.
//!
//! # Responsibility
//! - Define the closed set of value shapes a tag may be bound to.
//! - Render values in the persisted literal notation.
//!
//! # Invariants
//! - `Display` output is exactly what the persistence codec writes and
//!   re-parses; floats always carry a decimal point so they round-trip as
//!   floats.
//! - No value shape outside this enum is ever persisted or loaded.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One tag's bound value: scalar, list, or tuple.
///
/// Kept deliberately close to the literal notation of existing metadata
/// files so they load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Explicit absence marker, written as `None`.
    None,
    /// Boolean, written as `True`/`False`.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Single-quoted string with backslash escapes.
    Str(String),
    /// Ordered list, written `[a, b, c]`.
    List(Vec<Value>),
    /// Fixed tuple, written `(a, b)` with the `(a,)` one-element form.
    Tuple(Vec<Value>),
}

impl Value {
    /// Borrowed string payload, when this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Integer payload, when this value is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            _ => None,
        }
    }

    /// Borrowed element slice, when this value is a list or tuple.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Whether this value is an empty list or tuple.
    ///
    /// An empty well list means "no wells assigned" and drives event
    /// deletion during timeline sync.
    pub fn is_empty_sequence(&self) -> bool {
        self.as_items().is_some_and(<[Value]>::is_empty)
    }

    /// A `(rows, cols)` pair, when this value is a two-integer sequence.
    pub fn as_shape_pair(&self) -> Option<(usize, usize)> {
        let items = self.as_items()?;
        match items {
            [Value::Int(rows), Value::Int(cols)] if *rows > 0 && *cols > 0 => {
                Some((*rows as usize, *cols as usize))
            }
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Str(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Str(text)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Int(number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(number) => write!(f, "{number}"),
            Self::Float(number) => {
                if number.fract() == 0.0 && number.is_finite() {
                    write!(f, "{number:.1}")
                } else {
                    write!(f, "{number}")
                }
            }
            Self::Str(text) => {
                write!(f, "'")?;
                for ch in text.chars() {
                    match ch {
                        '\\' => write!(f, "\\\\")?,
                        '\'' => write!(f, "\\'")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "'")
            }
            Self::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Self::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_joined(f: &mut Formatter<'_>, items: &[Value]) -> std::fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
