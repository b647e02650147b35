// VCR-style navigation over a materialized trace

use crate::replay::autoplay::Autoplay;
use crate::trace::{Step, Trace};
use std::time::{Duration, Instant};

/// Cursor over a [`Trace`] with optional autoplay.
///
/// Until a trace is loaded the engine is "not ready" and every navigation
/// call is a no-op. Out-of-range moves are clamped, never errors.
#[derive(Debug, Clone, Default)]
pub struct ReplayEngine {
    /// Installed trace, if any
    trace: Option<Trace>,

    /// Index of the current step
    position: usize,

    autoplay: Autoplay,
}

impl ReplayEngine {
    /// Create an engine with the default autoplay cadence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that autoplays at `interval`
    pub fn with_interval(interval: Duration) -> Self {
        ReplayEngine {
            trace: None,
            position: 0,
            autoplay: Autoplay::new(interval),
        }
    }

    /// Install a trace: cursor to 0, autoplay off
    pub fn load(&mut self, trace: Trace) {
        tracing::info!(
            steps = trace.len(),
            algorithm = %trace.metadata().algorithm,
            "trace installed"
        );
        self.trace = Some(trace);
        self.position = 0;
        self.autoplay.stop();
    }

    pub fn is_ready(&self) -> bool {
        self.trace.is_some()
    }

    /// Move to the next step. Returns whether the cursor moved.
    pub fn advance(&mut self) -> bool {
        let Some(last) = self.last_index() else {
            return false;
        };
        if self.position >= last {
            return false;
        }
        self.position += 1;
        true
    }

    /// Move to the previous step. Returns whether the cursor moved.
    pub fn retreat(&mut self) -> bool {
        if !self.is_ready() || self.position == 0 {
            return false;
        }
        self.position -= 1;
        true
    }

    /// Cursor to the first step and stop autoplay
    pub fn reset(&mut self) {
        self.autoplay.stop();
        if self.is_ready() {
            self.position = 0;
        }
    }

    /// Cursor to the final step
    pub fn jump_to_end(&mut self) {
        if let Some(last) = self.last_index() {
            self.position = last;
        }
    }

    /// Cursor to `index`, clamped to the trace
    pub fn seek(&mut self, index: usize) {
        if let Some(last) = self.last_index() {
            self.position = index.min(last);
        }
    }

    /// Turn autoplay on or off.
    ///
    /// Enabling while parked on the last step restarts from step 0. Disabling
    /// stops immediately and changes nothing else.
    pub fn set_autoplay(&mut self, enabled: bool, now: Instant) {
        if !enabled {
            self.autoplay.stop();
            return;
        }
        let Some(last) = self.last_index() else {
            return;
        };
        if self.position >= last {
            self.position = 0;
        }
        self.autoplay.start(now);
    }

    /// Flip autoplay; returns the new state
    pub fn toggle_autoplay(&mut self, now: Instant) -> bool {
        let enable = !self.is_playing();
        self.set_autoplay(enable, now);
        self.is_playing()
    }

    /// Advance if an autoplay tick is due. Returns whether the cursor moved.
    ///
    /// Autoplay turns itself off once the last step is on screen.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.autoplay.take_due(now) {
            return false;
        }
        let moved = self.advance();
        if self.is_at_end() {
            self.autoplay.stop();
        }
        moved
    }

    /// How long the event loop may sleep before the next tick is due
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.autoplay.remaining(now)
    }

    pub fn is_playing(&self) -> bool {
        self.autoplay.is_running()
    }

    // ========== Getter methods for UI ==========

    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Step under the cursor
    pub fn current_step(&self) -> Option<&Step> {
        self.trace.as_ref()?.get(self.position)
    }

    /// Cursor position, `None` when not ready
    pub fn position(&self) -> Option<usize> {
        self.trace.as_ref().map(|_| self.position)
    }

    /// Total number of steps (0 when not ready)
    pub fn total_steps(&self) -> usize {
        self.trace.as_ref().map_or(0, Trace::len)
    }

    pub fn is_at_start(&self) -> bool {
        self.is_ready() && self.position == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.last_index().is_some_and(|last| self.position >= last)
    }

    fn last_index(&self) -> Option<usize> {
        self.trace.as_ref().map(Trace::last_index)
    }
}
