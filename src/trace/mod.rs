//! Trace model
//!
//! A [`Trace`] is the complete, ordered log of [`Step`]s from one algorithm
//! run, plus metadata. It is built once (by the local tracer or from a remote
//! [`TraceDocument`]) and never mutated afterwards.
//!
//! # Invariants
//!
//! Checked by [`Trace::new`], so every `Trace` value satisfies them:
//! - at least one step
//! - `steps[i].index == i`
//! - the last step is `ALGORITHM_COMPLETE`
//!
//! A document that breaks any of them is rejected as a whole; there is no
//! such thing as a partial trace.
//!
//! Services that send raw recursion events instead of snapshots are decoded
//! by [`events`]; [`ServiceDocument`] accepts either shape.

pub mod events;
pub mod step;

pub use events::{EventDocument, ServiceDocument};
pub use step::{FrameSnapshot, IntervalState, IntervalView, Step, StepData, StepKind};

use crate::model::{Interval, MaxEnd};
use crate::simulator::CallId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a step sequence is not a valid trace
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("Trace contains no steps")]
    Empty,

    #[error("Step at position {position} is numbered {index}")]
    IndexMismatch { position: usize, index: usize },

    #[error("Trace ends with {last} instead of ALGORITHM_COMPLETE")]
    Incomplete { last: &'static str },

    #[error("Trace declares {declared} steps but contains {actual}")]
    StepCountMismatch { declared: usize, actual: usize },

    #[error("Reported result does not match the final step")]
    ResultMismatch,

    #[error("Unknown event type {0}")]
    UnknownEvent(String),

    #[error("Event {step} has no {field}")]
    MissingField { step: usize, field: &'static str },

    #[error("Event {step} refers to call {call_id}, which never started")]
    UnknownCall { step: usize, call_id: u64 },

    #[error("Event {step} decides call {call_id} against its own bound")]
    DecisionMismatch { step: usize, call_id: CallId },

    #[error("Event {step} reports max_end {reported}, expected {expected}")]
    BoundMismatch {
        step: usize,
        reported: MaxEnd,
        expected: MaxEnd,
    },

    #[error("Event {step} returns from call {call_id} out of order")]
    UnexpectedReturn { step: usize, call_id: CallId },

    #[error("Event {step} return value for call {call_id} disagrees with its decisions")]
    ReturnMismatch { step: usize, call_id: CallId },

    #[error("Event {step} completes the run with {open} call(s) still open")]
    OpenCalls { step: usize, open: usize },
}

/// Facts about the run that produced a trace
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraceMetadata {
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub input_size: usize,
    #[serde(default)]
    pub output_size: usize,
}

/// Validated, immutable step sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    steps: Vec<Step>,
    metadata: TraceMetadata,
}

impl Trace {
    /// Validate `steps` and wrap them
    pub fn new(steps: Vec<Step>, metadata: TraceMetadata) -> Result<Self, TraceError> {
        let last = steps.last().ok_or(TraceError::Empty)?;
        if !last.kind.is_complete() {
            return Err(TraceError::Incomplete {
                last: last.kind.tag(),
            });
        }

        if let Some((position, step)) = steps
            .iter()
            .enumerate()
            .find(|(position, step)| step.index != *position)
        {
            return Err(TraceError::IndexMismatch {
                position,
                index: step.index,
            });
        }

        Ok(Trace { steps, metadata })
    }

    /// Build a trace from its wire form, checking it against its own summary
    pub fn from_document(document: TraceDocument) -> Result<Self, TraceError> {
        let TraceDocument {
            trace: body,
            metadata,
            result,
        } = document;

        if let Some(declared) = body.total_steps {
            if declared != body.steps.len() {
                return Err(TraceError::StepCountMismatch {
                    declared,
                    actual: body.steps.len(),
                });
            }
        }

        let trace = Trace::new(body.steps, metadata)?;
        if trace.result() != result.as_slice() {
            return Err(TraceError::ResultMismatch);
        }
        Ok(trace)
    }

    /// Wire form of this trace
    pub fn to_document(&self) -> TraceDocument {
        TraceDocument {
            trace: TraceBody {
                steps: self.steps.clone(),
                total_steps: Some(self.steps.len()),
            },
            metadata: self.metadata.clone(),
            result: self.result().to_vec(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final `ALGORITHM_COMPLETE` step
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn metadata(&self) -> &TraceMetadata {
        &self.metadata
    }

    /// Intervals kept by the run, read from the final step
    pub fn result(&self) -> &[Interval] {
        match self.steps.last().map(|s| &s.kind) {
            Some(StepKind::AlgorithmComplete { result, .. }) => result,
            _ => &[],
        }
    }
}

/// `trace` member of a [`TraceDocument`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceBody {
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<usize>,
}

/// Wire form exchanged with the trace service:
/// `{ "trace": { "steps": [...] }, "metadata": {...}, "result": [...] }`
///
/// Catalog responses wrap the same members in a `{"success": true, ...}`
/// envelope; unknown members are ignored so both decode here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceDocument {
    pub trace: TraceBody,
    #[serde(default)]
    pub metadata: TraceMetadata,
    #[serde(default)]
    pub result: Vec<Interval>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: usize, kind: StepKind) -> Step {
        Step {
            index,
            kind,
            description: String::new(),
            data: StepData::default(),
        }
    }

    fn complete() -> StepKind {
        StepKind::AlgorithmComplete {
            result: Vec::new(),
            kept_count: 0,
            removed_count: 0,
        }
    }

    #[test]
    fn test_empty_trace_rejected() {
        assert_eq!(
            Trace::new(Vec::new(), TraceMetadata::default()),
            Err(TraceError::Empty)
        );
    }

    #[test]
    fn test_trace_must_end_with_completion() {
        let steps = vec![step(0, StepKind::SortBegin)];
        assert_eq!(
            Trace::new(steps, TraceMetadata::default()),
            Err(TraceError::Incomplete { last: "SORT_BEGIN" })
        );
    }

    #[test]
    fn test_gap_in_indices_rejected() {
        let steps = vec![step(0, StepKind::SortBegin), step(2, complete())];
        assert_eq!(
            Trace::new(steps, TraceMetadata::default()),
            Err(TraceError::IndexMismatch {
                position: 1,
                index: 2
            })
        );
    }

    #[test]
    fn test_document_step_count_checked() {
        let document = TraceDocument {
            trace: TraceBody {
                steps: vec![step(0, complete())],
                total_steps: Some(3),
            },
            metadata: TraceMetadata::default(),
            result: Vec::new(),
        };
        assert_eq!(
            Trace::from_document(document),
            Err(TraceError::StepCountMismatch {
                declared: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_document_without_total_steps_accepted() {
        let json = r#"{
            "trace": {"steps": [{"index": 0, "type": "ALGORITHM_COMPLETE", "result": [],
                "kept_count": 0, "removed_count": 0, "description": "done",
                "data": {"all_intervals": [], "max_end": null, "call_stack": [], "active_call": null}}]},
            "metadata": {"input_size": 0},
            "result": []
        }"#;
        let document: TraceDocument = serde_json::from_str(json).unwrap();
        let trace = Trace::from_document(document).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.metadata().input_size, 0);
    }
}
