use super::{SourceError, TraceSource};
use crate::model::Interval;
use crate::simulator::trace_intervals;
use crate::trace::Trace;
use async_trait::async_trait;

/// Produces traces in-process with the call-stack simulator
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        LocalSource
    }
}

#[async_trait]
impl TraceSource for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, intervals: &[Interval]) -> Result<Trace, SourceError> {
        Ok(trace_intervals(intervals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IntervalColor;

    #[tokio::test]
    async fn test_local_fetch_matches_tracer() {
        let input = [
            Interval::new(1, 1, 4, IntervalColor::Blue),
            Interval::new(2, 2, 3, IntervalColor::Green),
        ];
        let trace = LocalSource::new().fetch(&input).await.unwrap();
        assert_eq!(trace, trace_intervals(&input).unwrap());
        assert_eq!(trace.result(), &input[..1]);
    }
}
