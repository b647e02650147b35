//! # Introduction
//!
//! intervis replays the "remove covered intervals" recursion one step at a
//! time. An interval `[a, b]` is covered by `[c, d]` when `c <= a` and
//! `b <= d`; the filter sorts its input by `(start asc, end desc)` and then
//! recurses over the sorted suffix, keeping each interval whose end passes the
//! running `max_end`.
//!
//! ## Pipeline
//!
//! ```text
//! Intervals → Trace Source → Trace → Replay Engine → TUI
//!                 │
//!                 ├─ local: call-stack simulator + tracer
//!                 └─ remote: trace service over HTTP
//! ```
//!
//! 1. [`model`]: intervals, display colors, the `max_end` bound.
//! 2. [`simulator`]: the recursion as an explicit frame arena driven one
//!    transition at a time, plus the tracer that records every transition.
//! 3. [`trace`]: the immutable step log and its JSON wire form.
//! 4. [`source`]: where traces come from (local, remote, catalog).
//! 5. [`replay`] and [`session`]: cursor, autoplay, and fetch bookkeeping.
//! 6. [`config`] and [`presets`]: TOML settings and built-in inputs.
//! 7. [`ui`]: ratatui-based TUI; not part of the stable library API.

pub mod config;
pub mod model;
pub mod presets;
pub mod replay;
pub mod session;
pub mod simulator;
pub mod source;
pub mod trace;
pub mod ui;
