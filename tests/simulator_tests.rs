// Integration tests for the call-stack simulator and tracer

use intervis::model::{remove_covered, Interval, IntervalColor, MaxEnd};
use intervis::presets::Preset;
use intervis::simulator::{trace_intervals, CallId, Decision, FrameStatus};
use intervis::trace::{IntervalState, StepKind};
use proptest::prelude::*;

fn iv(id: u64, start: i64, end: i64) -> Interval {
    Interval::new(id, start, end, IntervalColor::Blue)
}

#[test]
fn test_basic_example_step_sequence() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();

    let tags: Vec<&str> = trace.steps().iter().map(|s| s.kind.tag()).collect();
    assert_eq!(
        tags,
        vec![
            "INITIAL_STATE",
            "SORT_BEGIN",
            "SORT_COMPLETE",
            "EXAMINE",
            "DECIDE",
            "EXAMINE",
            "DECIDE",
            "EXAMINE",
            "DECIDE",
            "EXAMINE",
            "DECIDE",
            "RETURN",
            "RETURN",
            "RETURN",
            "RETURN",
            "ALGORITHM_COMPLETE",
        ]
    );

    let kept: Vec<u64> = trace.result().iter().map(|i| i.id).collect();
    assert_eq!(kept, vec![3, 4]);
    assert_eq!(trace.metadata().input_size, 4);
    assert_eq!(trace.metadata().output_size, 2);
}

#[test]
fn test_basic_example_decisions() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();

    let decisions: Vec<(u64, Decision, MaxEnd, MaxEnd)> = trace
        .steps()
        .iter()
        .filter_map(|s| match &s.kind {
            StepKind::Decide {
                interval,
                decision,
                max_end_before,
                max_end_after,
                ..
            } => Some((interval.id, *decision, *max_end_before, *max_end_after)),
            _ => None,
        })
        .collect();

    assert_eq!(
        decisions,
        vec![
            (3, Decision::Keep, MaxEnd::NegInfinity, MaxEnd::At(720)),
            (1, Decision::Covered, MaxEnd::At(720), MaxEnd::At(720)),
            // equal end counts as covered
            (2, Decision::Covered, MaxEnd::At(720), MaxEnd::At(720)),
            (4, Decision::Keep, MaxEnd::At(720), MaxEnd::At(960)),
        ]
    );
}

#[test]
fn test_returns_unwind_innermost_first() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let returns: Vec<(CallId, usize, Vec<u64>)> = trace
        .steps()
        .iter()
        .filter_map(|s| match &s.kind {
            StepKind::Return {
                call_id,
                depth,
                value,
            } => Some((*call_id, *depth, value.iter().map(|i| i.id).collect())),
            _ => None,
        })
        .collect();

    assert_eq!(
        returns,
        vec![
            (CallId(3), 3, vec![4]),
            (CallId(2), 2, vec![4]),
            (CallId(1), 1, vec![4]),
            (CallId(0), 0, vec![3, 4]),
        ]
    );
}

#[test]
fn test_display_switches_to_sorted_order() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let ids = |index: usize| -> Vec<u64> {
        trace.steps()[index]
            .data
            .all_intervals
            .iter()
            .map(|v| v.interval.id)
            .collect()
    };
    assert_eq!(ids(0), vec![1, 2, 3, 4]);
    assert_eq!(ids(1), vec![1, 2, 3, 4]);
    assert_eq!(ids(2), vec![3, 1, 2, 4]);
}

#[test]
fn test_final_states() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let last = trace.get(trace.last_index()).unwrap();
    let states: Vec<(u64, IntervalState)> = last
        .data
        .all_intervals
        .iter()
        .map(|v| (v.interval.id, v.state))
        .collect();
    assert_eq!(
        states,
        vec![
            (3, IntervalState::Kept),
            (1, IntervalState::Covered),
            (2, IntervalState::Covered),
            (4, IntervalState::Kept),
        ]
    );
}

#[test]
fn test_frames_are_frozen_per_step() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();

    // step 3 enters the root; nothing below it exists yet
    let entered = &trace.steps()[3].data;
    assert_eq!(entered.call_stack.len(), 1);
    assert_eq!(entered.call_stack[0].status, FrameStatus::Examining);
    assert_eq!(entered.active_call, Some(CallId::ROOT));

    // by the end the root has returned, but step 3 still shows it examining
    let last = &trace.steps()[trace.last_index()].data;
    assert_eq!(last.call_stack.len(), 4);
    assert!(last
        .call_stack
        .iter()
        .all(|f| f.status == FrameStatus::Returning));
    assert_eq!(entered.call_stack[0].status, FrameStatus::Examining);
}

#[test]
fn test_child_frames_record_their_parent() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let last = &trace.steps()[trace.last_index()].data;
    for (i, frame) in last.call_stack.iter().enumerate() {
        assert_eq!(frame.depth, i);
        let expected_parent = i.checked_sub(1).map(CallId);
        assert_eq!(frame.parent, expected_parent);
    }
}

#[test]
fn test_empty_input() {
    let trace = trace_intervals(&[]).unwrap();
    let tags: Vec<&str> = trace.steps().iter().map(|s| s.kind.tag()).collect();
    assert_eq!(
        tags,
        vec!["INITIAL_STATE", "SORT_BEGIN", "SORT_COMPLETE", "ALGORITHM_COMPLETE"]
    );
    assert!(trace.result().is_empty());
    assert!(trace.steps().iter().all(|s| s.data.call_stack.is_empty()));
}

#[test]
fn test_single_interval_is_kept() {
    let trace = trace_intervals(&[iv(1, 5, 9)]).unwrap();
    let frames = &trace.steps()[trace.last_index()].data.call_stack;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].decision, Some(Decision::Keep));
    assert_eq!(trace.result(), &[iv(1, 5, 9)]);
}

#[test]
fn test_disjoint_and_covered_presets() {
    let disjoint = trace_intervals(&Preset::Disjoint.intervals()).unwrap();
    assert_eq!(disjoint.result().len(), 3);

    let covered = trace_intervals(&Preset::Covered.intervals()).unwrap();
    let kept: Vec<u64> = covered.result().iter().map(|i| i.id).collect();
    assert_eq!(kept, vec![1]);
}

#[test]
fn test_inverted_interval_is_processed_as_given() {
    let trace = trace_intervals(&[iv(1, 10, 2), iv(2, 0, 20)]).unwrap();
    let kept: Vec<u64> = trace.result().iter().map(|i| i.id).collect();
    assert_eq!(kept, vec![2]);
}

#[test]
fn test_rerun_is_identical() {
    let input = Preset::Basic.intervals();
    assert_eq!(trace_intervals(&input).unwrap(), trace_intervals(&input).unwrap());
}

fn interval_strategy() -> impl Strategy<Value = Vec<Interval>> {
    prop::collection::vec((0i64..100, 0i64..50), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (start, len))| iv(i as u64 + 1, start, start + len))
            .collect()
    })
}

/// Pairwise containment check written from coordinates alone.
///
/// An interval is dropped when another one spans it. Of several identical
/// intervals only the first in input order survives.
fn pairwise_survivors(input: &[Interval]) -> Vec<Interval> {
    let spans = |outer: &Interval, inner: &Interval| {
        outer.start <= inner.start && inner.end <= outer.end
    };
    let mut survivors: Vec<(usize, Interval)> = input
        .iter()
        .enumerate()
        .filter(|&(i, candidate)| {
            !input.iter().enumerate().any(|(j, other)| {
                let identical = other.start == candidate.start && other.end == candidate.end;
                j != i && spans(other, candidate) && (!identical || j < i)
            })
        })
        .map(|(i, interval)| (i, *interval))
        .collect();
    survivors.sort_by_key(|&(i, interval)| (interval.start, std::cmp::Reverse(interval.end), i));
    survivors.into_iter().map(|(_, interval)| interval).collect()
}

#[test]
fn test_pairwise_survivors_on_basic_example() {
    let kept: Vec<u64> = pairwise_survivors(&Preset::Basic.intervals())
        .iter()
        .map(|i| i.id)
        .collect();
    let traced: Vec<u64> = trace_intervals(&Preset::Basic.intervals())
        .unwrap()
        .result()
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(kept, traced);
}

proptest! {
    #[test]
    fn prop_result_matches_pairwise_containment(input in interval_strategy()) {
        let trace = trace_intervals(&input).unwrap();
        let expected = pairwise_survivors(&input);
        prop_assert_eq!(trace.result(), expected.as_slice());
    }

    #[test]
    fn prop_result_matches_reference(input in interval_strategy()) {
        let trace = trace_intervals(&input).unwrap();
        let expected = remove_covered(&input);
        prop_assert_eq!(trace.result(), expected.as_slice());
    }

    #[test]
    fn prop_every_removed_interval_is_contained_in_a_kept_one(input in interval_strategy()) {
        let trace = trace_intervals(&input).unwrap();
        let kept = trace.result();
        for removed in input.iter().filter(|i| !kept.contains(i)) {
            prop_assert!(kept.iter().any(|k| k.contains(removed)));
        }
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                prop_assert!(!a.contains(b) && !b.contains(a));
            }
        }
    }

    #[test]
    fn prop_step_count_is_linear(input in interval_strategy()) {
        let trace = trace_intervals(&input).unwrap();
        let n = input.len();
        // 3 setup steps, examine + decide + return per call, one completion
        prop_assert_eq!(trace.len(), 3 + 3 * n + 1);
    }
}
