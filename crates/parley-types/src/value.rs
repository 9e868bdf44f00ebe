//! Property values and comparisons.
//!
//! Players, rooms and objects each carry an ordered property bag. Values are
//! deliberately small: booleans, integers and text cover everything the
//! declarative rule vocabulary needs, and ordered maps keep iteration and
//! state diffs deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// Free text.
    Text(String),
}

impl PropertyValue {
    /// Return the boolean payload, if this is a [`PropertyValue::Bool`].
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the integer payload, if this is a [`PropertyValue::Int`].
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Return the text payload, if this is a [`PropertyValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl core::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Mutable key/value properties attached to an entity.
pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// Comparison operator used by property predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Equal.
    #[default]
    Eq,
    /// Not equal. An absent property is never equal to anything.
    Ne,
    /// Strictly less than (integers only).
    Lt,
    /// Less than or equal (integers only).
    Le,
    /// Strictly greater than (integers only).
    Gt,
    /// Greater than or equal (integers only).
    Ge,
}

impl Comparison {
    /// Check `actual <op> expected`.
    ///
    /// A missing property only satisfies [`Comparison::Ne`]. Ordering
    /// comparisons between non-integers are always false.
    pub fn holds(self, actual: Option<&PropertyValue>, expected: &PropertyValue) -> bool {
        let Some(actual) = actual else {
            return self == Self::Ne;
        };
        match self {
            Self::Eq => actual == expected,
            Self::Ne => actual != expected,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => {
                let (Some(a), Some(b)) = (actual.as_int(), expected.as_int()) else {
                    return false;
                };
                match self {
                    Self::Lt => a < b,
                    Self::Le => a <= b,
                    Self::Gt => a > b,
                    _ => a >= b,
                }
            }
        }
    }

    /// Operator symbol for human-readable reasons.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}
