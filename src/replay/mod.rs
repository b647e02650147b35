//! Replay of a materialized trace
//!
//! - [`engine`]: [`ReplayEngine`], the cursor with advance/retreat/reset/autoplay
//! - [`autoplay`]: The deadline that drives automatic advancement
//!
//! The engine does not care where its [`Trace`](crate::trace::Trace) came
//! from; local and remote traces replay identically.

pub mod autoplay;
pub mod engine;

pub use autoplay::DEFAULT_AUTOPLAY_INTERVAL;
pub use engine::ReplayEngine;
