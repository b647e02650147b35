//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`timeline`]: Interval bars on a shared axis with the running `max_end` marker
//! - [`stack`]: Simulated call frames, outermost first
//! - [`step`]: Type, description and payload of the current step
//! - [`status`]: Status bar with keybindings and playback state
//! - [`notice`]: Loading and error placeholder shown before a trace is installed
//!
//! Each pane module exports a primary `render_*` function. Panes are stateless
//! apart from the [`ScrollState`] the app hands them.

mod scroll;

pub mod notice;
pub mod stack;
pub mod status;
pub mod step;
pub mod timeline;

pub use notice::render_notice_pane;
pub use scroll::ScrollState;
pub use stack::{render_stack_pane, StackRenderData};
pub use status::{render_status_bar, StatusRenderData};
pub use step::render_step_pane;
pub use timeline::{render_timeline_pane, TimelineRenderData};
