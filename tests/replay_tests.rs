// Integration tests for replay navigation and autoplay

use intervis::presets::Preset;
use intervis::replay::ReplayEngine;
use intervis::simulator::trace_intervals;
use std::time::{Duration, Instant};

fn loaded(interval: Duration) -> ReplayEngine {
    let mut engine = ReplayEngine::with_interval(interval);
    engine.load(trace_intervals(&Preset::Basic.intervals()).unwrap());
    engine
}

#[test]
fn test_advance_then_retreat_visits_every_step() {
    let mut engine = loaded(Duration::from_millis(1200));
    let n = engine.total_steps() - 1;

    let mut forward = vec![engine.current_step().unwrap().index];
    for _ in 0..n {
        assert!(engine.advance());
        forward.push(engine.current_step().unwrap().index);
    }
    assert_eq!(forward, (0..=n).collect::<Vec<_>>());
    assert!(engine.current_step().unwrap().kind.is_complete());

    let mut backward = Vec::new();
    for _ in 0..n {
        assert!(engine.retreat());
        backward.push(engine.current_step().unwrap().index);
    }
    assert_eq!(backward, (0..n).rev().collect::<Vec<_>>());
    assert!(engine.is_at_start());
}

#[test]
fn test_moves_past_the_ends_are_noops() {
    let mut engine = loaded(Duration::from_millis(1200));
    assert!(!engine.retreat());
    assert_eq!(engine.position(), Some(0));

    engine.jump_to_end();
    let end = engine.position();
    assert!(!engine.advance());
    assert_eq!(engine.position(), end);
}

#[test]
fn test_autoplay_advances_once_per_interval() {
    let interval = Duration::from_millis(1200);
    let mut engine = loaded(interval);
    let t0 = Instant::now();

    engine.set_autoplay(true, t0);
    assert!(!engine.tick(t0 + Duration::from_millis(1199)));
    assert_eq!(engine.position(), Some(0));

    assert!(engine.tick(t0 + interval));
    assert_eq!(engine.position(), Some(1));

    // next tick is scheduled from the previous one
    assert!(!engine.tick(t0 + interval + Duration::from_millis(600)));
    assert!(engine.tick(t0 + interval * 2));
    assert_eq!(engine.position(), Some(2));
}

#[test]
fn test_autoplay_runs_to_the_end_and_stops() {
    let interval = Duration::from_millis(10);
    let mut engine = loaded(interval);
    let mut now = Instant::now();
    engine.set_autoplay(true, now);

    let mut ticks = 0;
    while engine.is_playing() {
        now += interval;
        if engine.tick(now) {
            ticks += 1;
        }
        assert!(ticks <= engine.total_steps(), "autoplay never stopped");
    }
    assert_eq!(ticks, engine.total_steps() - 1);
    assert!(engine.is_at_end());

    // a late tick after stopping changes nothing
    assert!(!engine.tick(now + interval * 10));
    assert!(engine.is_at_end());
}

#[test]
fn test_enabling_autoplay_at_end_restarts() {
    let mut engine = loaded(Duration::from_millis(1200));
    engine.jump_to_end();
    engine.set_autoplay(true, Instant::now());
    assert_eq!(engine.position(), Some(0));
    assert!(engine.is_playing());
}

#[test]
fn test_pause_and_reset_stop_autoplay() {
    let t0 = Instant::now();
    let mut engine = loaded(Duration::from_millis(100));

    engine.set_autoplay(true, t0);
    engine.seek(5);
    engine.set_autoplay(false, t0);
    assert!(!engine.is_playing());
    assert_eq!(engine.position(), Some(5));
    assert!(!engine.tick(t0 + Duration::from_secs(10)));

    assert!(engine.toggle_autoplay(t0));
    engine.reset();
    assert!(!engine.is_playing());
    assert_eq!(engine.position(), Some(0));
}
