//! Event-stream trace documents
//!
//! Some trace services send the raw event log of the recursive filter
//! instead of display snapshots:
//!
//! ```json
//! {"step": 3, "type": "CALL_START", "timestamp": 0.0012,
//!  "data": {"call_id": 0, "depth": 0, "examining": {...}, "max_end": null, "intervals": [...]},
//!  "description": "Call #0: examining interval (540, 720)"}
//! ```
//!
//! Events are numbered by `step` or `step_number`, and the document's
//! `metadata` sits either at the top level or inside `trace`.
//! [`EventDocument::into_trace`] replays the log and rebuilds the steps the
//! local tracer would have recorded: one `EXAMINE`, `DECIDE` and `RETURN` per
//! call on a non-empty suffix. Calls on an empty suffix, `EXAMINING_INTERVAL`,
//! `BASE_CASE` and `MAX_END_UPDATE` produce no step; the bound reported by
//! `MAX_END_UPDATE` must match the one the replay computes.

use super::{
    FrameSnapshot, IntervalState, IntervalView, Step, StepData, StepKind, Trace, TraceDocument,
    TraceError, TraceMetadata,
};
use crate::model::{sort_for_filtering, Coord, Interval, IntervalId, MaxEnd};
use crate::simulator::{CallId, Decision, FrameStatus, ALGORITHM_ID};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::sync::Arc;

/// Any trace document a service may answer with
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServiceDocument {
    Steps(TraceDocument),
    Events(EventDocument),
}

impl ServiceDocument {
    pub fn into_trace(self) -> Result<Trace, TraceError> {
        match self {
            ServiceDocument::Steps(document) => Trace::from_document(document),
            ServiceDocument::Events(document) => document.into_trace(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDocument {
    pub trace: EventBody,
    #[serde(default)]
    pub metadata: Option<EventMetadata>,
    #[serde(default)]
    pub result: Option<Vec<Interval>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventBody {
    pub steps: Vec<EventStep>,
    #[serde(default)]
    pub total_steps: Option<usize>,
    #[serde(default)]
    pub metadata: Option<EventMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventMetadata {
    #[serde(default)]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventStep {
    #[serde(alias = "step_number")]
    pub step: usize,
    #[serde(rename = "type")]
    pub event: String,
    /// Seconds since the run started
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub data: EventData,
    #[serde(default)]
    pub description: Option<String>,
}

/// Union of the members any event may carry; unknown members are ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    pub call_id: Option<u64>,
    pub parent_id: Option<u64>,
    pub examining: Option<Interval>,
    pub intervals: Option<Vec<Interval>>,
    pub sorted_intervals: Option<Vec<Interval>>,
    pub remaining: Option<Vec<Interval>>,
    pub remaining_count: Option<usize>,
    pub decision: Option<Decision>,
    pub new_max_end: Option<Coord>,
    pub return_value: Option<Vec<Interval>>,
    pub result: Option<Vec<Interval>>,
    pub description: Option<String>,
}

impl EventDocument {
    pub fn into_trace(self) -> Result<Trace, TraceError> {
        let EventDocument {
            trace: body,
            metadata,
            result,
        } = self;

        if let Some(declared) = body.total_steps {
            if declared != body.steps.len() {
                return Err(TraceError::StepCountMismatch {
                    declared,
                    actual: body.steps.len(),
                });
            }
        }

        let algorithm = metadata
            .or(body.metadata)
            .and_then(|m| m.algorithm)
            .unwrap_or_else(|| ALGORITHM_ID.to_string());

        let mut replay = Replay::default();
        for (position, event) in body.steps.into_iter().enumerate() {
            if event.step != position {
                return Err(TraceError::IndexMismatch {
                    position,
                    index: event.step,
                });
            }
            replay.apply(event)?;
        }

        let metadata = TraceMetadata {
            algorithm,
            input_size: replay.display.len(),
            output_size: replay.kept,
        };
        tracing::debug!(
            steps = replay.steps.len(),
            calls = replay.frames.len(),
            "rebuilt trace from event stream"
        );

        let trace = Trace::new(replay.steps, metadata)?;
        if result.is_some_and(|result| trace.result() != result.as_slice()) {
            return Err(TraceError::ResultMismatch);
        }
        Ok(trace)
    }
}

/// Bound a frame hands to its child
fn outgoing_bound(frame: &FrameSnapshot) -> MaxEnd {
    match frame.decision {
        Some(Decision::Keep) => frame.max_end.raise(frame.current.end),
        _ => frame.max_end,
    }
}

/// Display and call state accumulated while replaying events
#[derive(Default)]
struct Replay {
    display: Vec<Interval>,
    states: FxHashMap<IntervalId, IntervalState>,
    frames: Vec<FrameSnapshot>,
    /// Service call id to frame, for calls on a non-empty suffix
    calls: FxHashMap<u64, CallId>,
    /// Service ids of calls on an empty suffix that have not returned yet
    empty_calls: FxHashSet<u64>,
    /// Calls that started and have not returned, innermost last
    live: Vec<CallId>,
    max_end: MaxEnd,
    active: Option<CallId>,
    kept: usize,
    steps: Vec<Step>,
}

impl Replay {
    fn apply(&mut self, event: EventStep) -> Result<(), TraceError> {
        let EventStep {
            step,
            event: tag,
            data,
            description,
            ..
        } = event;

        let described = match tag.as_str() {
            "INITIAL_STATE" => {
                self.display = data
                    .intervals
                    .clone()
                    .ok_or(TraceError::MissingField {
                        step,
                        field: "intervals",
                    })?;
                Some((
                    StepKind::InitialState {
                        count: self.display.len(),
                    },
                    "Original unsorted intervals".to_string(),
                ))
            }
            "SORT_BEGIN" => Some((StepKind::SortBegin, "Sorting by (start ↑, end ↓)".to_string())),
            "SORT_COMPLETE" => {
                self.display = match data.sorted_intervals.clone().or_else(|| data.intervals.clone()) {
                    Some(sorted) => sorted,
                    None => sort_for_filtering(&self.display),
                };
                Some((
                    StepKind::SortComplete,
                    "Intervals sorted - ready for recursion".to_string(),
                ))
            }
            "CALL_START" => self.enter(step, &data)?,
            "EXAMINING_INTERVAL" | "BASE_CASE" => None,
            "DECISION_MADE" => Some(self.decide(step, &data)?),
            "MAX_END_UPDATE" => {
                self.check_bound(step, &data)?;
                None
            }
            "CALL_RETURN" => self.leave(step, &data)?,
            "ALGORITHM_COMPLETE" => Some(self.complete(step, &data)?),
            _ => return Err(TraceError::UnknownEvent(tag)),
        };

        if let Some((kind, fallback)) = described {
            let description = description.or(data.description).unwrap_or(fallback);
            self.record(kind, description);
        }
        Ok(())
    }

    fn call_id(step: usize, data: &EventData) -> Result<u64, TraceError> {
        data.call_id.ok_or(TraceError::MissingField {
            step,
            field: "call_id",
        })
    }

    fn lookup(&self, step: usize, call_id: u64) -> Result<CallId, TraceError> {
        self.calls
            .get(&call_id)
            .copied()
            .ok_or(TraceError::UnknownCall { step, call_id })
    }

    fn frame_mut(&mut self, step: usize, call_id: CallId) -> Result<&mut FrameSnapshot, TraceError> {
        self.frames
            .get_mut(call_id.index())
            .ok_or(TraceError::UnknownCall {
                step,
                call_id: call_id.index() as u64,
            })
    }

    fn enter(
        &mut self,
        step: usize,
        data: &EventData,
    ) -> Result<Option<(StepKind, String)>, TraceError> {
        let service_id = Self::call_id(step, data)?;
        let suffix = data.intervals.as_deref().or(data.remaining.as_deref());
        let Some(head) = data
            .examining
            .or_else(|| suffix.and_then(|s| s.first().copied()))
        else {
            self.empty_calls.insert(service_id);
            return Ok(None);
        };

        let remaining_count = match (suffix, data.remaining_count) {
            (Some(suffix), _) => suffix.len(),
            // a separately sent head is not part of the count
            (None, Some(count)) if data.examining.is_some() => count + 1,
            (None, Some(count)) => count,
            (None, None) => {
                return Err(TraceError::MissingField {
                    step,
                    field: "remaining_count",
                })
            }
        };

        let parent = match data.parent_id {
            Some(parent_id) => Some(self.lookup(step, parent_id)?),
            None => self.live.last().copied(),
        };
        let (depth, max_end) = match parent {
            Some(parent) => {
                let frame = self.frame_mut(step, parent)?;
                (frame.depth + 1, outgoing_bound(frame))
            }
            None => (0, MaxEnd::NegInfinity),
        };

        let call_id = CallId(self.frames.len());
        self.frames.push(FrameSnapshot {
            call_id,
            depth,
            parent,
            current: head,
            remaining_count,
            max_end,
            status: FrameStatus::Examining,
            decision: None,
            return_value: None,
        });
        self.calls.insert(service_id, call_id);
        self.live.push(call_id);
        self.active = Some(call_id);
        self.states.insert(head.id, IntervalState::Examining);

        Ok(Some((
            StepKind::Examine {
                call_id,
                depth,
                interval: head,
            },
            format!("Call {call_id}: examining interval {head} with max_end = {max_end}"),
        )))
    }

    fn decide(&mut self, step: usize, data: &EventData) -> Result<(StepKind, String), TraceError> {
        let call_id = self.lookup(step, Self::call_id(step, data)?)?;
        let decision = data.decision.ok_or(TraceError::MissingField {
            step,
            field: "decision",
        })?;

        let frame = self.frame_mut(step, call_id)?;
        let max_end_before = frame.max_end;
        let covered = max_end_before.covers(frame.current.end);
        if covered == decision.is_keep() {
            return Err(TraceError::DecisionMismatch { step, call_id });
        }
        frame.decision = Some(decision);
        frame.status = FrameStatus::Decided;
        let interval = frame.current;
        let max_end_after = outgoing_bound(frame);

        self.max_end = max_end_after;
        self.active = Some(call_id);
        let state = match decision {
            Decision::Keep => IntervalState::Kept,
            Decision::Covered => IntervalState::Covered,
        };
        self.states.insert(interval.id, state);

        Ok((
            StepKind::Decide {
                call_id,
                interval,
                decision,
                max_end_before,
                max_end_after,
            },
            format!("Decision: {} {}", decision.label(), interval),
        ))
    }

    fn check_bound(&mut self, step: usize, data: &EventData) -> Result<(), TraceError> {
        let call_id = self.lookup(step, Self::call_id(step, data)?)?;
        let expected = outgoing_bound(self.frame_mut(step, call_id)?);
        let reported = MaxEnd::from(data.new_max_end);
        if reported != expected {
            return Err(TraceError::BoundMismatch {
                step,
                reported,
                expected,
            });
        }
        Ok(())
    }

    fn leave(
        &mut self,
        step: usize,
        data: &EventData,
    ) -> Result<Option<(StepKind, String)>, TraceError> {
        let service_id = Self::call_id(step, data)?;
        if self.empty_calls.remove(&service_id) {
            return Ok(None);
        }
        let call_id = self.lookup(step, service_id)?;
        if self.live.last() != Some(&call_id) {
            return Err(TraceError::UnexpectedReturn { step, call_id });
        }

        let child_value = self
            .frames
            .iter()
            .find(|f| f.parent == Some(call_id))
            .map(|child| child.return_value.clone());
        let frame = self.frame_mut(step, call_id)?;
        let Some(decision) = frame.decision else {
            return Err(TraceError::UnexpectedReturn { step, call_id });
        };

        let mut value = Vec::new();
        if decision.is_keep() {
            value.push(frame.current);
        }
        match child_value {
            Some(Some(child)) => value.extend_from_slice(&child),
            Some(None) => return Err(TraceError::UnexpectedReturn { step, call_id }),
            None => {}
        }
        if data.return_value.as_ref().is_some_and(|reported| *reported != value) {
            return Err(TraceError::ReturnMismatch { step, call_id });
        }

        frame.status = FrameStatus::Returning;
        frame.return_value = Some(Arc::from(value.as_slice()));
        let depth = frame.depth;
        let parent = frame.parent;
        if let Some(parent) = parent {
            self.frame_mut(step, parent)?.status = FrameStatus::Returning;
        }
        self.live.pop();
        self.active = parent;

        let description = format!("Call {call_id} returning {} interval(s)", value.len());
        Ok(Some((
            StepKind::Return {
                call_id,
                depth,
                value,
            },
            description,
        )))
    }

    fn complete(&mut self, step: usize, data: &EventData) -> Result<(StepKind, String), TraceError> {
        let open = self.live.len() + self.empty_calls.len();
        if open > 0 {
            return Err(TraceError::OpenCalls { step, open });
        }

        let result = self
            .frames
            .first()
            .and_then(|root| root.return_value.as_deref())
            .map(<[Interval]>::to_vec)
            .unwrap_or_default();
        if data.result.as_ref().is_some_and(|reported| *reported != result) {
            return Err(TraceError::ResultMismatch);
        }

        self.active = None;
        self.kept = result.len();
        let total = self.display.len();
        let kept_count = result.len();
        Ok((
            StepKind::AlgorithmComplete {
                result,
                kept_count,
                removed_count: total.saturating_sub(kept_count),
            },
            format!("Algorithm complete: kept {kept_count}/{total} intervals"),
        ))
    }

    fn record(&mut self, kind: StepKind, description: String) {
        let all_intervals = self
            .display
            .iter()
            .map(|interval| IntervalView {
                interval: *interval,
                state: self.states.get(&interval.id).copied().unwrap_or_default(),
            })
            .collect();

        self.steps.push(Step {
            index: self.steps.len(),
            kind,
            description,
            data: StepData {
                all_intervals,
                max_end: self.max_end,
                call_stack: self.frames.clone(),
                active_call: self.active,
            },
        });
    }
}
