//! Interval representation
//!
//! An [`Interval`] is a small `Copy` record. Frames and steps refer to the
//! input by position or hold their own frozen copies, so nothing downstream
//! ever mutates an interval once it has been read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval coordinate (the sample inputs use minutes since midnight)
pub type Coord = i64;

/// Interval identifier, unique within one input set
pub type IntervalId = u64;

/// Display tag attached to every interval.
///
/// The set is closed: an unknown tag in JSON input is a deserialization error,
/// never a silent fallback. A missing tag defaults to [`IntervalColor::Blue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalColor {
    #[default]
    Blue,
    Green,
    Amber,
    Purple,
    Red,
    Cyan,
    Pink,
    Orange,
}

impl IntervalColor {
    /// Every tag, in declaration order
    pub const ALL: [IntervalColor; 8] = [
        IntervalColor::Blue,
        IntervalColor::Green,
        IntervalColor::Amber,
        IntervalColor::Purple,
        IntervalColor::Red,
        IntervalColor::Cyan,
        IntervalColor::Pink,
        IntervalColor::Orange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntervalColor::Blue => "blue",
            IntervalColor::Green => "green",
            IntervalColor::Amber => "amber",
            IntervalColor::Purple => "purple",
            IntervalColor::Red => "red",
            IntervalColor::Cyan => "cyan",
            IntervalColor::Pink => "pink",
            IntervalColor::Orange => "orange",
        }
    }
}

/// A closed interval `[start, end]` with a display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub id: IntervalId,
    pub start: Coord,
    pub end: Coord,
    #[serde(default)]
    pub color: IntervalColor,
}

impl Interval {
    pub fn new(id: IntervalId, start: Coord, end: Coord, color: IntervalColor) -> Self {
        Interval {
            id,
            start,
            end,
            color,
        }
    }

    /// `start > end`. Such intervals are accepted as-is.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Check if this interval fully contains `other`
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_defaults_to_blue_when_missing() {
        let parsed: Interval = serde_json::from_str(r#"{"id":1,"start":540,"end":660}"#).unwrap();
        assert_eq!(parsed.color, IntervalColor::Blue);
    }

    #[test]
    fn test_unknown_color_is_rejected() {
        let parsed = serde_json::from_str::<Interval>(
            r#"{"id":1,"start":540,"end":660,"color":"chartreuse"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_color_names_match_serde() {
        for color in IntervalColor::ALL {
            let json = serde_json::to_string(&color).unwrap();
            assert_eq!(json, format!("\"{}\"", color.name()));
        }
    }

    #[test]
    fn test_contains() {
        let outer = Interval::new(1, 540, 720, IntervalColor::Amber);
        let inner = Interval::new(2, 600, 720, IntervalColor::Green);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_inverted_interval_is_flagged() {
        assert!(Interval::new(1, 10, 5, IntervalColor::Red).is_inverted());
        assert!(!Interval::new(1, 5, 5, IntervalColor::Red).is_inverted());
    }
}
