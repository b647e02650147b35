//! Fetch bookkeeping around a [`ReplayEngine`]
//!
//! Every fetch is tagged with a [`Ticket`]. Only the newest ticket may
//! install its result, so a slow response that lands after a newer request
//! was issued is dropped instead of overwriting what the user asked for last.
//!
//! A [`SimulatorError`] is not a failed request but a broken invariant in the
//! local simulator, so [`Session::resolve`] hands it back to the caller as an
//! error instead of recording it as a retryable failure.

use crate::replay::ReplayEngine;
use crate::simulator::SimulatorError;
use crate::source::SourceError;
use crate::trace::Trace;
use std::time::Duration;

/// Identifies one fetch request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Pending,
    Ready,
    Failed {
        message: String,
        /// Whether sending the same request again could succeed
        retryable: bool,
    },
}

impl LoadState {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed { .. })
    }
}

/// What [`Session::resolve`] did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Trace installed, cursor at 0
    Applied,
    /// Superseded by a newer fetch; ignored
    Stale,
    /// Error recorded; any previous trace is still loaded
    Failed,
}

#[derive(Debug, Default)]
pub struct Session {
    engine: ReplayEngine,
    generation: u64,
    state: LoadState,
}

impl Session {
    pub fn new(autoplay_interval: Duration) -> Self {
        Session {
            engine: ReplayEngine::with_interval(autoplay_interval),
            generation: 0,
            state: LoadState::Idle,
        }
    }

    /// Start a new fetch, superseding any in flight
    pub fn begin_fetch(&mut self) -> Ticket {
        self.generation += 1;
        self.state = LoadState::Pending;
        Ticket(self.generation)
    }

    /// Apply a fetch result.
    ///
    /// Simulator errors are returned whatever the ticket, since they mean the
    /// local state machine is broken rather than that one request failed.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<Trace, SourceError>,
    ) -> Result<Resolution, SimulatorError> {
        let result = match result {
            Err(SourceError::Simulator(err)) => {
                tracing::error!(error = %err, "simulator invariant violated");
                self.state = LoadState::Failed {
                    message: err.to_string(),
                    retryable: false,
                };
                return Err(err);
            }
            other => other,
        };

        if ticket.0 != self.generation {
            tracing::warn!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale fetch result"
            );
            return Ok(Resolution::Stale);
        }

        Ok(match result {
            Ok(trace) => {
                self.engine.load(trace);
                self.state = LoadState::Ready;
                Resolution::Applied
            }
            Err(err) => {
                tracing::error!(error = %err, retryable = err.is_retryable(), "fetch failed");
                self.state = LoadState::Failed {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                };
                Resolution::Failed
            }
        })
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == LoadState::Pending
    }

    pub fn engine(&self) -> &ReplayEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ReplayEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interval, IntervalColor};
    use crate::simulator::{trace_intervals, CallId};

    fn trace_of(n: u64) -> Trace {
        let intervals: Vec<Interval> = (0..n)
            .map(|i| Interval::new(i, i as i64 * 10, i as i64 * 10 + 5, IntervalColor::Blue))
            .collect();
        trace_intervals(&intervals).unwrap()
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut session = Session::default();
        let first = session.begin_fetch();
        let second = session.begin_fetch();

        assert_eq!(session.resolve(first, Ok(trace_of(1))), Ok(Resolution::Stale));
        assert!(session.is_pending());
        assert!(!session.engine().is_ready());

        assert_eq!(session.resolve(second, Ok(trace_of(2))), Ok(Resolution::Applied));
        assert_eq!(session.state(), &LoadState::Ready);
        assert_eq!(session.engine().position(), Some(0));
    }

    #[test]
    fn test_failure_keeps_previous_trace() {
        let mut session = Session::default();
        let ticket = session.begin_fetch();
        session.resolve(ticket, Ok(trace_of(3))).unwrap();
        session.engine_mut().advance();

        let ticket = session.begin_fetch();
        let failure = Err(SourceError::Rejected("Invalid input format".to_string()));
        assert_eq!(session.resolve(ticket, failure), Ok(Resolution::Failed));

        assert_eq!(
            session.state(),
            &LoadState::Failed {
                message: "Request rejected: Invalid input format".to_string(),
                retryable: false,
            }
        );
        assert!(session.engine().is_ready());
        assert_eq!(session.engine().position(), Some(1));
    }

    #[test]
    fn test_server_error_is_retryable() {
        let mut session = Session::default();
        let ticket = session.begin_fetch();
        let failure = Err(SourceError::Status {
            status: 503,
            message: "busy".to_string(),
        });
        session.resolve(ticket, failure).unwrap();
        assert!(matches!(
            session.state(),
            LoadState::Failed { retryable: true, .. }
        ));
    }

    #[test]
    fn test_simulator_error_is_fatal() {
        let mut session = Session::default();
        let stale = session.begin_fetch();
        let _current = session.begin_fetch();
        let broken = SimulatorError::MissingFrame {
            call_id: CallId(4),
        };

        assert_eq!(
            session.resolve(stale, Err(SourceError::Simulator(broken.clone()))),
            Err(broken)
        );
        assert!(matches!(
            session.state(),
            LoadState::Failed {
                retryable: false,
                ..
            }
        ));
    }
}
