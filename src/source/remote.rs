use super::http::ApiClient;
use super::{SourceError, TraceSource};
use crate::model::Interval;
use crate::trace::{ServiceDocument, Trace};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Request body for both trace endpoints
#[derive(Debug, Serialize)]
pub(crate) struct TraceRequest<'a> {
    pub intervals: &'a [Interval],
}

/// Fetches traces from a trace service.
///
/// Without an algorithm id the request goes to `{base}/trace`; with one it
/// goes to the catalog route `{base}/algorithm/{id}/trace`. Both answer with a
/// snapshot [`TraceDocument`](crate::trace::TraceDocument) or an
/// [`EventDocument`](crate::trace::EventDocument).
#[derive(Debug, Clone)]
pub struct RemoteSource {
    api: ApiClient,
    algorithm: Option<String>,
}

impl RemoteSource {
    pub fn new(
        base_url: impl Into<String>,
        algorithm: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout)?,
            algorithm,
        })
    }

    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    fn trace_path(&self) -> String {
        match &self.algorithm {
            Some(id) => format!("algorithm/{id}/trace"),
            None => "trace".to_string(),
        }
    }

    /// Full URL the next fetch will POST to
    pub fn endpoint(&self) -> String {
        self.api.url(&self.trace_path())
    }
}

#[async_trait]
impl TraceSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch(&self, intervals: &[Interval]) -> Result<Trace, SourceError> {
        let document: ServiceDocument = self
            .api
            .post(&self.trace_path(), &TraceRequest { intervals })
            .await?;
        let trace = document.into_trace()?;
        tracing::info!(
            endpoint = %self.endpoint(),
            steps = trace.len(),
            "remote trace received"
        );
        Ok(trace)
    }
}
