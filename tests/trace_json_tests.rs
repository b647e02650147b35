// Integration tests for the trace document wire format

use intervis::model::MaxEnd;
use intervis::presets::{parse_intervals, Preset};
use intervis::simulator::trace_intervals;
use intervis::trace::{Trace, TraceDocument, TraceError};
use serde_json::{json, Value};

#[test]
fn test_document_round_trip() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let json = serde_json::to_string(&trace.to_document()).unwrap();
    let document: TraceDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(Trace::from_document(document).unwrap(), trace);
}

#[test]
fn test_document_shape() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let value = serde_json::to_value(trace.to_document()).unwrap();

    assert_eq!(value["trace"]["total_steps"], json!(16));
    assert_eq!(value["metadata"]["algorithm"], json!("interval-coverage"));
    assert_eq!(
        value["result"],
        json!([
            {"id": 3, "start": 540, "end": 720, "color": "amber"},
            {"id": 4, "start": 900, "end": 960, "color": "purple"}
        ])
    );

    let first_decide = &value["trace"]["steps"][4];
    assert_eq!(first_decide["type"], json!("DECIDE"));
    assert_eq!(first_decide["decision"], json!("keep"));
    assert_eq!(first_decide["max_end_before"], Value::Null);
    assert_eq!(first_decide["max_end_after"], json!(720));
    assert_eq!(first_decide["data"]["active_call"], json!(0));
}

#[test]
fn test_negative_infinity_is_null() {
    assert_eq!(serde_json::to_value(MaxEnd::NegInfinity).unwrap(), Value::Null);
    assert_eq!(serde_json::from_value::<MaxEnd>(Value::Null).unwrap(), MaxEnd::NegInfinity);
    assert_eq!(serde_json::from_value::<MaxEnd>(json!(12)).unwrap(), MaxEnd::At(12));
}

#[test]
fn test_truncated_document_rejected() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let mut value = serde_json::to_value(trace.to_document()).unwrap();
    let steps = value["trace"]["steps"].as_array_mut().unwrap();
    steps.pop();
    let len = steps.len();
    value["trace"]["total_steps"] = json!(len);

    let document: TraceDocument = serde_json::from_value(value).unwrap();
    assert_eq!(
        Trace::from_document(document),
        Err(TraceError::Incomplete { last: "RETURN" })
    );
}

#[test]
fn test_tampered_result_rejected() {
    let trace = trace_intervals(&Preset::Basic.intervals()).unwrap();
    let mut document = trace.to_document();
    document.result.pop();
    assert_eq!(Trace::from_document(document), Err(TraceError::ResultMismatch));
}

#[test]
fn test_envelope_members_are_ignored() {
    let trace = trace_intervals(&Preset::Disjoint.intervals()).unwrap();
    let mut value = serde_json::to_value(trace.to_document()).unwrap();
    value["success"] = json!(true);
    let document: TraceDocument = serde_json::from_value(value).unwrap();
    assert_eq!(Trace::from_document(document).unwrap(), trace);
}

#[test]
fn test_input_file_feeds_tracer() {
    let intervals = parse_intervals(
        r#"{"intervals": [
            {"id": 1, "start": 1, "end": 4, "color": "cyan"},
            {"id": 2, "start": 3, "end": 6, "color": "pink"},
            {"id": 3, "start": 2, "end": 8, "color": "orange"}
        ]}"#,
    )
    .unwrap();
    let trace = trace_intervals(&intervals).unwrap();
    let kept: Vec<u64> = trace.result().iter().map(|i| i.id).collect();
    assert_eq!(kept, vec![1, 3]);
}
