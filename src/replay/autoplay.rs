//! Autoplay deadline tracking
//!
//! Autoplay is not a background timer. It is a deadline that the event loop
//! checks on every pass, so there is nothing to cancel on teardown: dropping
//! the owner drops the deadline.

use std::time::{Duration, Instant};

/// Cadence used when none is configured
pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone)]
pub struct Autoplay {
    interval: Duration,
    /// `Some` while playing
    next_due: Option<Instant>,
}

impl Autoplay {
    pub fn new(interval: Duration) -> Self {
        Autoplay {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start playing; the first tick fires one interval from `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Consume a due tick, scheduling the next one.
    ///
    /// The next deadline is one interval after the previous deadline, so a
    /// late poll does not stretch the cadence. After a stall longer than an
    /// interval the schedule restarts from `now`: at most one tick is
    /// reported per call and steps are never skipped.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let next = due + self.interval;
                self.next_due = Some(if next > now { next } else { now + self.interval });
                true
            }
            _ => false,
        }
    }

    /// Time left until the next tick, if playing
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOPLAY_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_interval() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::new(Duration::from_millis(100));
        autoplay.start(t0);
        assert!(!autoplay.take_due(t0 + Duration::from_millis(99)));
        assert!(autoplay.take_due(t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_one_tick_per_call_after_stall() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::new(Duration::from_millis(100));
        autoplay.start(t0);
        let late = t0 + Duration::from_secs(5);
        assert!(autoplay.take_due(late));
        assert!(!autoplay.take_due(late));
        assert_eq!(autoplay.remaining(late), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_late_poll_keeps_cadence() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::new(Duration::from_millis(1200));
        autoplay.start(t0);

        // polled 50ms after the first deadline
        assert!(autoplay.take_due(t0 + Duration::from_millis(1250)));
        assert!(!autoplay.take_due(t0 + Duration::from_millis(2399)));
        assert!(autoplay.take_due(t0 + Duration::from_millis(2400)));
        assert_eq!(
            autoplay.remaining(t0 + Duration::from_millis(2400)),
            Some(Duration::from_millis(1200))
        );
    }

    #[test]
    fn test_stopped_never_due() {
        let t0 = Instant::now();
        let mut autoplay = Autoplay::default();
        assert!(!autoplay.take_due(t0 + Duration::from_secs(60)));
        assert_eq!(autoplay.remaining(t0), None);
        assert_eq!(autoplay.interval(), DEFAULT_AUTOPLAY_INTERVAL);
    }
}
