//! Built-in inputs and input files

use crate::model::{Interval, IntervalColor, IntervalId};
use clap::ValueEnum;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse intervals: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Interval id {0} appears more than once")]
    DuplicateId(IntervalId),
}

/// Named sample inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Two overlapping meetings inside a longer one, plus a separate one
    #[default]
    Basic,
    /// Nothing overlaps, so nothing is removed
    Disjoint,
    /// One long interval swallows the rest
    Covered,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Basic, Preset::Disjoint, Preset::Covered];

    pub fn title(self) -> &'static str {
        match self {
            Preset::Basic => "Basic Example",
            Preset::Disjoint => "All Disjoint",
            Preset::Covered => "All Covered",
        }
    }

    pub fn intervals(self) -> Vec<Interval> {
        use IntervalColor::*;
        let rows: &[(IntervalId, i64, i64, IntervalColor)] = match self {
            Preset::Basic => &[
                (1, 540, 660, Blue),
                (2, 600, 720, Green),
                (3, 540, 720, Amber),
                (4, 900, 960, Purple),
            ],
            Preset::Disjoint => &[(1, 100, 200, Blue), (2, 300, 400, Green), (3, 500, 600, Amber)],
            Preset::Covered => &[(1, 100, 500, Amber), (2, 150, 200, Blue), (3, 250, 350, Green)],
        };
        rows.iter()
            .map(|&(id, start, end, color)| Interval::new(id, start, end, color))
            .collect()
    }
}

/// Accepted input file shapes: a bare array or `{"intervals": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Bare(Vec<Interval>),
    Wrapped { intervals: Vec<Interval> },
}

pub fn parse_intervals(json: &str) -> Result<Vec<Interval>, InputError> {
    let intervals = match serde_json::from_str::<InputDocument>(json)? {
        InputDocument::Bare(intervals) | InputDocument::Wrapped { intervals } => intervals,
    };

    let mut seen = FxHashSet::default();
    if let Some(dup) = intervals.iter().find(|iv| !seen.insert(iv.id)) {
        return Err(InputError::DuplicateId(dup.id));
    }
    Ok(intervals)
}

pub fn load_intervals(path: &Path) -> Result<Vec<Interval>, InputError> {
    let json = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_intervals(&json)
}
