//! Running maximum-end bound
//!
//! The recursion starts with "nothing kept yet", which the algorithm treats as
//! negative infinity. Rather than smuggling an `f64::NEG_INFINITY` through
//! integer coordinates, [`MaxEnd`] makes the sentinel an explicit variant.
//!
//! On the wire the sentinel is `null`, matching what the trace service emits,
//! so a JSON document never has to carry an infinity.

use super::interval::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest `end` among the intervals kept so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Coord>", into = "Option<Coord>")]
pub enum MaxEnd {
    /// No interval kept yet. Orders below every finite bound.
    #[default]
    NegInfinity,
    At(Coord),
}

impl MaxEnd {
    /// An interval ending at `end` is covered iff `end <= bound`
    pub fn covers(self, end: Coord) -> bool {
        match self {
            MaxEnd::NegInfinity => false,
            MaxEnd::At(bound) => end <= bound,
        }
    }

    /// Bound after keeping an interval that ends at `end`
    pub fn raise(self, end: Coord) -> MaxEnd {
        self.max(MaxEnd::At(end))
    }

    /// Finite value, if any
    pub fn value(self) -> Option<Coord> {
        match self {
            MaxEnd::NegInfinity => None,
            MaxEnd::At(v) => Some(v),
        }
    }
}

impl From<Option<Coord>> for MaxEnd {
    fn from(value: Option<Coord>) -> Self {
        value.map_or(MaxEnd::NegInfinity, MaxEnd::At)
    }
}

impl From<MaxEnd> for Option<Coord> {
    fn from(bound: MaxEnd) -> Self {
        bound.value()
    }
}

impl fmt::Display for MaxEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxEnd::NegInfinity => write!(f, "-∞"),
            MaxEnd::At(v) => write!(f, "{}", v),
        }
    }
}
