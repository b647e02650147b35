//! Call-stack simulator for the covered-intervals filter
//!
//! This module provides the local trace producer:
//! - [`frame`]: Call frame arena and the per-frame state machine
//! - [`engine`]: [`Simulator`], which advances the recursion one transition at a time
//! - [`tracer`]: Eager driver that records a [`Step`](crate::trace::Step) per transition
//! - [`errors`]: Invariant-violation error type
//!
//! # Execution Model
//!
//! The recursive filter is never run as native recursion. Instead every call is
//! an explicit [`frame::CallFrame`] in an arena, and a cursor names the frame
//! the next transition acts on:
//!
//! ```text
//! examining ──decide──▶ decided ──tail?──▶ push child (cursor → child)
//!                          │
//!                          └─no tail──▶ returning (cursor → parent)
//! returning ──absorb child value──▶ cursor → parent, or complete at the root
//! ```

pub mod engine;
pub mod errors;
pub mod frame;
pub mod tracer;

pub use engine::{Simulator, Transition};
pub use errors::SimulatorError;
pub use frame::{CallFrame, CallId, CallStack, Decision, FrameStatus};
pub use tracer::{trace_intervals, ALGORITHM_ID};
