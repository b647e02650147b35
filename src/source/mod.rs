//! Trace sources
//!
//! A [`TraceSource`] turns an interval list into a validated
//! [`Trace`]. The rest of the crate never knows which one produced it.
//!
//! - [`local`]: [`LocalSource`], the in-process simulator
//! - [`remote`]: [`RemoteSource`], a trace service over HTTP
//! - [`catalog`]: [`CatalogClient`] for the service's algorithm catalog
//! - [`errors`]: [`SourceError`]

pub mod catalog;
pub mod errors;
pub mod http;
pub mod local;
pub mod remote;

pub use catalog::{group_by_category, AlgorithmInfo, CatalogClient, Complexity};
pub use errors::SourceError;
pub use http::DEFAULT_REQUEST_TIMEOUT;
pub use local::LocalSource;
pub use remote::RemoteSource;

use crate::model::Interval;
use crate::trace::Trace;
use async_trait::async_trait;

#[async_trait]
pub trait TraceSource: Send + Sync {
    /// Short label for logs and the status bar
    fn name(&self) -> &str;

    /// Produce the complete trace for `intervals`.
    ///
    /// There is no partial success: either the whole validated trace or an error.
    async fn fetch(&self, intervals: &[Interval]) -> Result<Trace, SourceError>;
}
