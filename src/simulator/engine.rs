// Step-wise execution engine for the covered-intervals filter

use crate::model::{sort_for_filtering, Interval, MaxEnd};
use crate::simulator::errors::SimulatorError;
use crate::simulator::frame::{CallFrame, CallId, CallStack, Decision, FrameStatus};
use std::sync::Arc;

/// One state change of the simulated recursion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A frame was created and is now examining its head interval
    Entered { call_id: CallId },

    /// The active frame classified its head interval
    Decided {
        call_id: CallId,
        decision: Decision,
        max_end_before: MaxEnd,
        max_end_after: MaxEnd,
    },

    /// A frame produced its return value and handed control to its parent
    Returned {
        call_id: CallId,
        value: Vec<Interval>,
    },

    /// The root value is final; nothing is left to simulate
    Completed { result: Vec<Interval> },
}

/// Where the run as a whole stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    /// The active cursor points at this frame
    Running(CallId),
    /// Root returned; the completion transition is still pending
    RootReturned,
    Complete,
}

/// Explicit call-stack emulation of
///
/// ```text
/// filter([], _)            = []
/// filter([h, ..t], bound)  = if h.end <= bound { filter(t, bound) }
///                            else { [h] ++ filter(t, max(bound, h.end)) }
/// ```
///
/// Each [`Simulator::step`] performs exactly one [`Transition`], so the
/// recursion can be paused between any two of them.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// Input in filtering order; frames address it by offset
    sorted: Vec<Interval>,

    /// Every frame created so far
    stack: CallStack,

    phase: Phase,

    /// Most recent bound produced by a decision
    max_end: MaxEnd,

    /// Final result, once the root has returned
    result: Option<Vec<Interval>>,
}

impl Simulator {
    /// Create a simulator over intervals that are already in filtering order
    pub fn new(sorted: Vec<Interval>) -> Self {
        Simulator {
            sorted,
            stack: CallStack::new(),
            phase: Phase::NotStarted,
            max_end: MaxEnd::NegInfinity,
            result: None,
        }
    }

    /// Sort `intervals` by `(start asc, end desc)` and create a simulator
    pub fn from_unsorted(intervals: &[Interval]) -> Self {
        Self::new(sort_for_filtering(intervals))
    }

    /// Perform the next transition.
    ///
    /// Returns `Ok(None)` once the run is complete; calling again after that
    /// keeps returning `Ok(None)` without touching any state.
    pub fn step(&mut self) -> Result<Option<Transition>, SimulatorError> {
        let transition = match self.phase {
            Phase::Complete => return Ok(None),
            Phase::NotStarted => self.enter_root(),
            Phase::RootReturned => self.complete()?,
            Phase::Running(call_id) => match self.frame(call_id)?.status {
                FrameStatus::Examining => self.decide(call_id)?,
                FrameStatus::Decided => self.descend_or_return(call_id)?,
                FrameStatus::Returning => self.absorb_child(call_id)?,
            },
        };

        tracing::debug!(?transition, "simulator transition");
        Ok(Some(transition))
    }

    /// Step until completion and return the filtered intervals
    pub fn run_to_completion(&mut self) -> Result<Vec<Interval>, SimulatorError> {
        while self.step()?.is_some() {}
        Ok(self.result.clone().unwrap_or_default())
    }

    fn enter_root(&mut self) -> Transition {
        match self.sorted.first().copied() {
            None => {
                self.phase = Phase::Complete;
                self.result = Some(Vec::new());
                Transition::Completed { result: Vec::new() }
            }
            Some(head) => {
                let root =
                    self.stack
                        .push_frame(None, 0, head, self.sorted.len(), MaxEnd::NegInfinity);
                self.phase = Phase::Running(root);
                Transition::Entered { call_id: root }
            }
        }
    }

    /// examining -> decided
    fn decide(&mut self, call_id: CallId) -> Result<Transition, SimulatorError> {
        let frame = self.frame_mut(call_id)?;
        let max_end_before = frame.max_end;
        let decision = if max_end_before.covers(frame.current.end) {
            Decision::Covered
        } else {
            Decision::Keep
        };
        frame.decision = Some(decision);
        frame.status = FrameStatus::Decided;
        let max_end_after = frame.outgoing_max_end();

        self.max_end = max_end_after;
        Ok(Transition::Decided {
            call_id,
            decision,
            max_end_before,
            max_end_after,
        })
    }

    /// decided -> child pushed, or decided -> returning for the base case
    fn descend_or_return(&mut self, call_id: CallId) -> Result<Transition, SimulatorError> {
        let frame = self.frame(call_id)?;
        if !frame.has_tail() {
            let value = match frame.decision {
                Some(Decision::Keep) => vec![frame.current],
                _ => Vec::new(),
            };
            return self.finish_frame(call_id, value);
        }

        let offset = frame.offset + 1;
        let bound = frame.outgoing_max_end();
        let head = self
            .sorted
            .get(offset)
            .copied()
            .ok_or(SimulatorError::SuffixExhausted { call_id, offset })?;
        let remaining = self.sorted.len() - offset;

        let child = self
            .stack
            .push_frame(Some(call_id), offset, head, remaining, bound);
        self.frame_mut(call_id)?.child = Some(child);
        self.phase = Phase::Running(child);
        Ok(Transition::Entered { call_id: child })
    }

    /// returning -> parent, bubbling the child's value up
    fn absorb_child(&mut self, call_id: CallId) -> Result<Transition, SimulatorError> {
        let frame = self.frame(call_id)?;
        let child_id = frame.child.ok_or(SimulatorError::MissingChild { call_id })?;
        let child_value = self
            .frame(child_id)?
            .return_value
            .as_ref()
            .ok_or(SimulatorError::ChildPending { call_id, child_id })?;

        let mut value = Vec::with_capacity(child_value.len() + 1);
        if frame.decision.is_some_and(Decision::is_keep) {
            value.push(frame.current);
        }
        value.extend_from_slice(child_value);
        self.finish_frame(call_id, value)
    }

    /// Store the return value and move the cursor to the parent.
    ///
    /// The parent becomes `Returning` right away: its only remaining work is to
    /// absorb this value, so it is never re-entered in `Decided`.
    fn finish_frame(
        &mut self,
        call_id: CallId,
        value: Vec<Interval>,
    ) -> Result<Transition, SimulatorError> {
        let frame = self.frame_mut(call_id)?;
        frame.status = FrameStatus::Returning;
        frame.return_value = Some(Arc::from(value.as_slice()));
        let parent = frame.parent;

        match parent {
            Some(parent_id) => {
                self.frame_mut(parent_id)?.status = FrameStatus::Returning;
                self.phase = Phase::Running(parent_id);
            }
            None => self.phase = Phase::RootReturned,
        }

        Ok(Transition::Returned { call_id, value })
    }

    fn complete(&mut self) -> Result<Transition, SimulatorError> {
        let result = self
            .frame(CallId::ROOT)?
            .return_value
            .as_deref()
            .map(<[Interval]>::to_vec)
            .unwrap_or_default();
        self.phase = Phase::Complete;
        self.result = Some(result.clone());
        Ok(Transition::Completed { result })
    }

    fn frame(&self, call_id: CallId) -> Result<&CallFrame, SimulatorError> {
        self.stack
            .get(call_id)
            .ok_or(SimulatorError::MissingFrame { call_id })
    }

    fn frame_mut(&mut self, call_id: CallId) -> Result<&mut CallFrame, SimulatorError> {
        self.stack
            .get_mut(call_id)
            .ok_or(SimulatorError::MissingFrame { call_id })
    }

    // ========== Getter methods for tracing and UI ==========

    /// The input in filtering order
    pub fn sorted(&self) -> &[Interval] {
        &self.sorted
    }

    /// The frame arena
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    /// Frame the next transition will act on
    pub fn active(&self) -> Option<CallId> {
        match self.phase {
            Phase::Running(call_id) => Some(call_id),
            _ => None,
        }
    }

    /// Latest bound produced by a decision (`-∞` before the first one)
    pub fn max_end(&self) -> MaxEnd {
        self.max_end
    }

    /// Final filtered intervals, once complete
    pub fn result(&self) -> Option<&[Interval]> {
        self.result.as_deref()
    }
}
