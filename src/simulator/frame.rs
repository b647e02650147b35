//! Call frame arena
//!
//! This module provides the explicit call stack that replaces native recursion:
//! - [`CallStack`]: Arena of every frame created during a run, indexed by [`CallId`]
//! - [`CallFrame`]: One simulated activation of the recursive filter
//! - [`FrameStatus`] / [`Decision`]: The per-frame state machine
//!
//! # Lifetime
//!
//! Frames are never popped. A finished frame stays in the arena with its
//! return value so the call tree can still be drawn; the whole arena is
//! discarded together with the simulator.
//!
//! # Linear recursion
//!
//! The filter recurses exactly once per call (into the suffix tail), so each
//! frame has at most one child. Both directions are stored explicitly:
//! `parent` is fixed at creation and `child` is set when the tail is entered.

use crate::model::{Interval, MaxEnd};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a simulated call, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub usize);

impl CallId {
    pub const ROOT: CallId = CallId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a frame is in its three-state lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStatus {
    /// Head interval not yet compared against the bound
    Examining,
    /// Decision made; next move is to enter the tail or return
    Decided,
    /// Waiting to hand a return value to the parent (or already has)
    Returning,
}

impl FrameStatus {
    pub fn label(self) -> &'static str {
        match self {
            FrameStatus::Examining => "examining",
            FrameStatus::Decided => "decided",
            FrameStatus::Returning => "returning",
        }
    }
}

/// Outcome of comparing a frame's head interval with its bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Keep,
    Covered,
}

impl Decision {
    pub fn is_keep(self) -> bool {
        matches!(self, Decision::Keep)
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Keep => "KEEP",
            Decision::Covered => "COVERED",
        }
    }
}

/// One simulated call of `filter(sorted[offset..], max_end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    pub call_id: CallId,
    pub depth: usize,
    pub parent: Option<CallId>,
    pub child: Option<CallId>,
    /// Start of this frame's suffix in the sorted input
    pub offset: usize,
    /// Head of the suffix
    pub current: Interval,
    /// Suffix length, head included (always >= 1)
    pub remaining_count: usize,
    /// Incoming bound
    pub max_end: MaxEnd,
    pub status: FrameStatus,
    pub decision: Option<Decision>,
    /// Shared with every step that captures this frame after it returns
    pub return_value: Option<Arc<[Interval]>>,
}

impl CallFrame {
    /// Whether intervals remain after the head
    pub fn has_tail(&self) -> bool {
        self.remaining_count > 1
    }

    /// Bound handed to the child call.
    ///
    /// Equal to the incoming bound until the frame keeps its head.
    pub fn outgoing_max_end(&self) -> MaxEnd {
        match self.decision {
            Some(Decision::Keep) => self.max_end.raise(self.current.end),
            _ => self.max_end,
        }
    }
}

/// Arena of call frames for a single run
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack { frames: Vec::new() }
    }

    /// Create a frame in `Examining` state and return its id
    pub fn push_frame(
        &mut self,
        parent: Option<CallId>,
        offset: usize,
        current: Interval,
        remaining_count: usize,
        max_end: MaxEnd,
    ) -> CallId {
        let call_id = CallId(self.frames.len());
        let depth = parent
            .and_then(|p| self.get(p))
            .map_or(0, |frame| frame.depth + 1);

        self.frames.push(CallFrame {
            call_id,
            depth,
            parent,
            child: None,
            offset,
            current,
            remaining_count,
            max_end,
            status: FrameStatus::Examining,
            decision: None,
            return_value: None,
        });
        call_id
    }

    pub fn get(&self, call_id: CallId) -> Option<&CallFrame> {
        self.frames.get(call_id.index())
    }

    pub fn get_mut(&mut self, call_id: CallId) -> Option<&mut CallFrame> {
        self.frames.get_mut(call_id.index())
    }

    /// All frames in creation order (for UI display)
    pub fn frames(&self) -> &[CallFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
