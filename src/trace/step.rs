//! Step representation
//!
//! A [`Step`] is one frozen point in an algorithm run. The step's `type` tag
//! selects a per-kind payload ([`StepKind`]); every step also carries the
//! full display state ([`StepData`]) so a renderer never has to replay earlier
//! steps to draw the current one.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "index": 4,
//!   "type": "DECIDE",
//!   "call_id": 0,
//!   "interval": {"id": 3, "start": 540, "end": 720, "color": "amber"},
//!   "decision": "keep",
//!   "max_end_before": null,
//!   "max_end_after": 720,
//!   "description": "...",
//!   "data": {"all_intervals": [...], "max_end": 720, "call_stack": [...], "active_call": 0}
//! }
//! ```

use crate::model::{Interval, MaxEnd};
use crate::simulator::frame::{CallFrame, CallId, Decision, FrameStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind-specific payload of a step, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    /// Input as given, before sorting
    InitialState { count: usize },

    SortBegin,

    /// Input is now in `(start asc, end desc)` order
    SortComplete,

    /// A call frame was entered
    Examine {
        call_id: CallId,
        depth: usize,
        interval: Interval,
    },

    /// A call frame classified its head interval
    Decide {
        call_id: CallId,
        interval: Interval,
        decision: Decision,
        max_end_before: MaxEnd,
        max_end_after: MaxEnd,
    },

    /// A call frame returned to its parent
    Return {
        call_id: CallId,
        depth: usize,
        value: Vec<Interval>,
    },

    AlgorithmComplete {
        result: Vec<Interval>,
        kept_count: usize,
        removed_count: usize,
    },
}

impl StepKind {
    /// The `type` tag as it appears on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            StepKind::InitialState { .. } => "INITIAL_STATE",
            StepKind::SortBegin => "SORT_BEGIN",
            StepKind::SortComplete => "SORT_COMPLETE",
            StepKind::Examine { .. } => "EXAMINE",
            StepKind::Decide { .. } => "DECIDE",
            StepKind::Return { .. } => "RETURN",
            StepKind::AlgorithmComplete { .. } => "ALGORITHM_COMPLETE",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StepKind::AlgorithmComplete { .. })
    }

    /// Call frame this step is about, if any
    pub fn call_id(&self) -> Option<CallId> {
        match self {
            StepKind::Examine { call_id, .. }
            | StepKind::Decide { call_id, .. }
            | StepKind::Return { call_id, .. } => Some(*call_id),
            _ => None,
        }
    }
}

/// Display state of one input interval at a given step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalState {
    /// Not examined yet
    #[default]
    Idle,
    Examining,
    Kept,
    Covered,
}

/// An input interval together with its display state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalView {
    #[serde(flatten)]
    pub interval: Interval,
    pub state: IntervalState,
}

/// Frozen copy of a call frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub call_id: CallId,
    pub depth: usize,
    pub parent: Option<CallId>,
    pub current: Interval,
    pub remaining_count: usize,
    pub max_end: MaxEnd,
    pub status: FrameStatus,
    pub decision: Option<Decision>,
    pub return_value: Option<Arc<[Interval]>>,
}

impl FrameSnapshot {
    pub fn capture(frame: &CallFrame) -> Self {
        FrameSnapshot {
            call_id: frame.call_id,
            depth: frame.depth,
            parent: frame.parent,
            current: frame.current,
            remaining_count: frame.remaining_count,
            max_end: frame.max_end,
            status: frame.status,
            decision: frame.decision,
            return_value: frame.return_value.clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// State shared by every step kind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepData {
    /// Every input interval, in the order currently on display
    pub all_intervals: Vec<IntervalView>,
    pub max_end: MaxEnd,
    /// Every frame created so far, in creation order
    pub call_stack: Vec<FrameSnapshot>,
    /// Frame the next transition acts on
    pub active_call: Option<CallId>,
}

impl StepData {
    pub fn frame(&self, call_id: CallId) -> Option<&FrameSnapshot> {
        self.call_stack.iter().find(|f| f.call_id == call_id)
    }

    /// Ids from the root down to `call_id`, inclusive, following `parent`
    pub fn caller_chain(&self, call_id: CallId) -> Vec<CallId> {
        let mut chain = Vec::new();
        let mut cursor = Some(call_id);
        while let Some(frame) = cursor.and_then(|id| self.frame(id)) {
            // decoded documents may carry cyclic parent ids
            if chain.contains(&frame.call_id) {
                break;
            }
            chain.push(frame.call_id);
            cursor = frame.parent;
        }
        chain.reverse();
        chain
    }
}

/// One immutable snapshot in a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    #[serde(flatten)]
    pub kind: StepKind,
    pub description: String,
    pub data: StepData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IntervalColor;

    #[test]
    fn test_unit_kind_serializes_as_bare_tag() {
        let step = Step {
            index: 1,
            kind: StepKind::SortBegin,
            description: "Sorting".to_string(),
            data: StepData::default(),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "SORT_BEGIN");
        assert_eq!(json["index"], 1);
        assert!(json["data"]["max_end"].is_null());
    }

    #[test]
    fn test_decide_step_round_trips() {
        let interval = Interval::new(3, 540, 720, IntervalColor::Amber);
        let step = Step {
            index: 4,
            kind: StepKind::Decide {
                call_id: CallId(0),
                interval,
                decision: Decision::Keep,
                max_end_before: MaxEnd::NegInfinity,
                max_end_after: MaxEnd::At(720),
            },
            description: "Decision: KEEP".to_string(),
            data: StepData {
                all_intervals: vec![IntervalView {
                    interval,
                    state: IntervalState::Kept,
                }],
                max_end: MaxEnd::At(720),
                call_stack: Vec::new(),
                active_call: Some(CallId(0)),
            },
        };

        let text = serde_json::to_string(&step).unwrap();
        let back: Step = serde_json::from_str(&text).unwrap();
        assert_eq!(back, step);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "DECIDE");
        assert_eq!(json["decision"], "keep");
        assert!(json["max_end_before"].is_null());
        assert_eq!(json["data"]["all_intervals"][0]["color"], "amber");
        assert_eq!(json["data"]["all_intervals"][0]["state"], "kept");
    }

    #[test]
    fn test_caller_chain_walks_parents() {
        let frame = |id: usize, parent: Option<usize>| FrameSnapshot {
            call_id: CallId(id),
            depth: id,
            parent: parent.map(CallId),
            current: Interval::new(id as u64, 0, 10, IntervalColor::Blue),
            remaining_count: 3 - id,
            max_end: MaxEnd::NegInfinity,
            status: FrameStatus::Examining,
            decision: None,
            return_value: None,
        };
        let data = StepData {
            call_stack: vec![frame(0, None), frame(1, Some(0)), frame(2, Some(1))],
            ..StepData::default()
        };

        assert_eq!(data.caller_chain(CallId(2)), vec![CallId(0), CallId(1), CallId(2)]);
        assert_eq!(data.caller_chain(CallId(0)), vec![CallId(0)]);
        assert!(data.caller_chain(CallId(7)).is_empty());
        assert!(data.call_stack[0].is_root());
        assert!(!data.call_stack[2].is_root());
    }

    #[test]
    fn test_caller_chain_stops_on_cycle() {
        let mut data = StepData::default();
        for (id, parent) in [(0, 1), (1, 0)] {
            data.call_stack.push(FrameSnapshot {
                call_id: CallId(id),
                depth: 0,
                parent: Some(CallId(parent)),
                current: Interval::new(id as u64, 0, 1, IntervalColor::Blue),
                remaining_count: 1,
                max_end: MaxEnd::NegInfinity,
                status: FrameStatus::Examining,
                decision: None,
                return_value: None,
            });
        }
        assert_eq!(data.caller_chain(CallId(0)), vec![CallId(1), CallId(0)]);
    }

    #[test]
    fn test_call_id_accessor() {
        let kind = StepKind::Return {
            call_id: CallId(2),
            depth: 2,
            value: Vec::new(),
        };
        assert_eq!(kind.call_id(), Some(CallId(2)));
        assert_eq!(StepKind::SortComplete.call_id(), None);
        assert_eq!(kind.tag(), "RETURN");
    }
}
