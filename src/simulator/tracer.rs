//! Eager trace recording
//!
//! [`trace_intervals`] runs the whole algorithm up front: it records the
//! initial and sorting steps, then drives a [`Simulator`] to completion and
//! turns every [`Transition`] into a [`Step`]. Each step captures frozen
//! copies of the frames, so later transitions cannot alter earlier steps.

use crate::model::{Interval, IntervalId, MaxEnd};
use crate::simulator::engine::{Simulator, Transition};
use crate::simulator::errors::SimulatorError;
use crate::simulator::frame::Decision;
use crate::trace::{
    FrameSnapshot, IntervalState, IntervalView, Step, StepData, StepKind, Trace, TraceMetadata,
};
use rustc_hash::FxHashMap;

/// Catalog identifier of the covered-intervals algorithm
pub const ALGORITHM_ID: &str = "interval-coverage";

/// Run the covered-intervals filter over `intervals` and record every step
pub fn trace_intervals(intervals: &[Interval]) -> Result<Trace, SimulatorError> {
    for interval in intervals.iter().filter(|i| i.is_inverted()) {
        tracing::warn!(
            id = interval.id,
            start = interval.start,
            end = interval.end,
            "interval starts after it ends; processing it as given"
        );
    }

    let mut recorder = Recorder::new(intervals);

    recorder.record(
        StepKind::InitialState {
            count: intervals.len(),
        },
        "Original unsorted intervals".to_string(),
        None,
    );
    recorder.record(
        StepKind::SortBegin,
        "Sorting by (start ↑, end ↓)".to_string(),
        None,
    );

    let mut simulator = Simulator::from_unsorted(intervals);
    recorder.display = simulator.sorted().to_vec();
    recorder.record(
        StepKind::SortComplete,
        "Intervals sorted - ready for recursion".to_string(),
        None,
    );

    while let Some(transition) = simulator.step()? {
        let (kind, description) = recorder.describe(&simulator, transition)?;
        recorder.record(kind, description, Some(&simulator));
    }

    let output_size = simulator.result().map_or(0, <[Interval]>::len);
    let metadata = TraceMetadata {
        algorithm: ALGORITHM_ID.to_string(),
        input_size: intervals.len(),
        output_size,
    };

    tracing::debug!(
        steps = recorder.steps.len(),
        input_size = metadata.input_size,
        output_size,
        "recorded local trace"
    );

    Ok(Trace::new(recorder.steps, metadata)?)
}

/// Accumulates steps and the per-interval display state
struct Recorder {
    /// Intervals in the order currently shown (input order until sorted)
    display: Vec<Interval>,
    states: FxHashMap<IntervalId, IntervalState>,
    steps: Vec<Step>,
}

impl Recorder {
    fn new(intervals: &[Interval]) -> Self {
        Recorder {
            display: intervals.to_vec(),
            states: FxHashMap::default(),
            steps: Vec::new(),
        }
    }

    /// Translate a transition into a step kind, updating display state
    fn describe(
        &mut self,
        simulator: &Simulator,
        transition: Transition,
    ) -> Result<(StepKind, String), SimulatorError> {
        let frame_of = |call_id| {
            simulator
                .stack()
                .get(call_id)
                .ok_or(SimulatorError::MissingFrame { call_id })
        };

        Ok(match transition {
            Transition::Entered { call_id } => {
                let frame = frame_of(call_id)?;
                self.states
                    .insert(frame.current.id, IntervalState::Examining);
                (
                    StepKind::Examine {
                        call_id,
                        depth: frame.depth,
                        interval: frame.current,
                    },
                    format!(
                        "Call {}: examining interval {} with max_end = {}",
                        call_id, frame.current, frame.max_end
                    ),
                )
            }
            Transition::Decided {
                call_id,
                decision,
                max_end_before,
                max_end_after,
            } => {
                let frame = frame_of(call_id)?;
                let state = match decision {
                    Decision::Keep => IntervalState::Kept,
                    Decision::Covered => IntervalState::Covered,
                };
                self.states.insert(frame.current.id, state);
                (
                    StepKind::Decide {
                        call_id,
                        interval: frame.current,
                        decision,
                        max_end_before,
                        max_end_after,
                    },
                    decision_text(frame.current, decision, max_end_before, max_end_after),
                )
            }
            Transition::Returned { call_id, value } => {
                let frame = frame_of(call_id)?;
                let description = format!(
                    "Call {} returning {} interval(s)",
                    call_id,
                    value.len()
                );
                (
                    StepKind::Return {
                        call_id,
                        depth: frame.depth,
                        value,
                    },
                    description,
                )
            }
            Transition::Completed { result } => {
                let total = self.display.len();
                let kept_count = result.len();
                (
                    StepKind::AlgorithmComplete {
                        result,
                        kept_count,
                        removed_count: total - kept_count,
                    },
                    format!(
                        "Algorithm complete: kept {}/{} intervals",
                        kept_count, total
                    ),
                )
            }
        })
    }

    fn record(&mut self, kind: StepKind, description: String, simulator: Option<&Simulator>) {
        let all_intervals = self
            .display
            .iter()
            .map(|interval| IntervalView {
                interval: *interval,
                state: self.states.get(&interval.id).copied().unwrap_or_default(),
            })
            .collect();

        let data = match simulator {
            Some(sim) => StepData {
                all_intervals,
                max_end: sim.max_end(),
                call_stack: sim
                    .stack()
                    .frames()
                    .iter()
                    .map(FrameSnapshot::capture)
                    .collect(),
                active_call: sim.active(),
            },
            None => StepData {
                all_intervals,
                max_end: MaxEnd::NegInfinity,
                call_stack: Vec::new(),
                active_call: None,
            },
        };

        self.steps.push(Step {
            index: self.steps.len(),
            kind,
            description,
            data,
        });
    }
}

fn decision_text(
    interval: Interval,
    decision: Decision,
    before: MaxEnd,
    after: MaxEnd,
) -> String {
    match decision {
        Decision::Keep => format!(
            "Decision: KEEP {} since end {} > max_end {}; max_end {} → {}",
            interval, interval.end, before, before, after
        ),
        Decision::Covered => format!(
            "Decision: COVERED {} since end {} ≤ max_end {}",
            interval, interval.end, before
        ),
    }
}
