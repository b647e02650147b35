//! Input data model for the covered-intervals visualizer
//!
//! This module provides the value types shared by every other layer:
//! - [`interval`]: The [`Interval`] record and its [`IntervalColor`] tag
//! - [`bound`]: The running [`MaxEnd`] bound with its negative-infinity sentinel
//!
//! # Ordering
//!
//! The algorithm only ever looks at intervals sorted by `(start ascending,
//! end descending)`. When two intervals share a start, the longer one comes
//! first so that it raises the bound before the shorter one is examined.
//! [`sort_for_filtering`] is the single place that ordering is defined.

pub mod bound;
pub mod interval;

pub use bound::MaxEnd;
pub use interval::{Coord, Interval, IntervalColor, IntervalId};

use std::cmp::Ordering;

/// Compare two intervals by `(start asc, end desc)`
pub fn filter_order(a: &Interval, b: &Interval) -> Ordering {
    a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end))
}

/// Return a copy of `intervals` in filtering order.
///
/// The sort is stable, so intervals that tie on both coordinates keep their
/// input order and repeated runs see the exact same sequence.
pub fn sort_for_filtering(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(filter_order);
    sorted
}

/// Direct, non-stepping implementation of "remove covered intervals".
///
/// Used to cross-check the simulator's result.
pub fn remove_covered(intervals: &[Interval]) -> Vec<Interval> {
    let mut bound = MaxEnd::NegInfinity;
    let mut kept = Vec::new();
    for interval in sort_for_filtering(intervals) {
        if !bound.covers(interval.end) {
            bound = bound.raise(interval.end);
            kept.push(interval);
        }
    }
    kept
}
