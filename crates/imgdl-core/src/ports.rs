//! Port definitions.
//!
//! The pipeline talks to the network and to progress displays only through
//! these traits. Adapters (the `reqwest` fetcher, the terminal progress bar)
//! live in their own crates.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;
use crate::outcome::BatchSummary;

/// HTTP GET returning the response body.
///
/// Implementations are shared by every worker, so they must be thread-safe.
/// Timeout, proxy choice and headers are fixed when the implementation is
/// built; a call only names the URL.
#[async_trait]
pub trait FetchPort: Send + Sync {
    /// Fetch `url`, treating any non-2xx status as a failure.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Receives batch progress.
///
/// Any `Fn(completed, total)` closure is a reporter.
pub trait ProgressReporter: Send + Sync {
    /// Called once before the first URL is dispatched.
    fn start(&self, _total: usize) {}

    /// Called after every finished URL, successful or not.
    fn update(&self, completed: usize, total: usize);

    /// Called once when the batch is over.
    fn finish(&self, _summary: &BatchSummary) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn update(&self, completed: usize, total: usize) {
        self(completed, total);
    }
}

/// A reporter that ignores all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn update(&self, _completed: usize, _total: usize) {}
}
