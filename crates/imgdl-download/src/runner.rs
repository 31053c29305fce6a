//! Bounded fan-out over a list of URLs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use imgdl_core::{
    BatchResult, DownloadError, DownloadOutcome, NoopProgress, ProgressReporter, UrlOutcome,
};

use crate::task::{DownloadTask, TaskReport};

/// Runs a [`DownloadTask`] for every URL with at most `n_workers` in flight.
///
/// Results come back in input order regardless of completion order. A
/// failing URL never stops the others.
pub struct BatchRunner {
    task: Arc<DownloadTask>,
    n_workers: usize,
    progress: Arc<dyn ProgressReporter>,
    cancel: CancellationToken,
}

impl BatchRunner {
    /// `n_workers` below 1 is treated as 1.
    pub fn new(task: Arc<DownloadTask>, n_workers: usize) -> Self {
        Self {
            task,
            n_workers: n_workers.max(1),
            progress: Arc::new(NoopProgress),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Stop dispatching new URLs once `cancel` fires.
    ///
    /// URLs already in flight finish normally; the rest are reported as
    /// [`DownloadError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub const fn n_workers(&self) -> usize {
        self.n_workers
    }

    pub fn task(&self) -> &DownloadTask {
        &self.task
    }

    pub async fn run<I, S>(&self, urls: I, force: bool) -> BatchResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        let total = urls.len();
        self.progress.start(total);

        if total == 0 {
            let result = BatchResult::default();
            self.progress.finish(&result.summary());
            return result;
        }

        info!(total, workers = self.n_workers, force, "Starting batch");

        let mut slots: Vec<Option<Result<TaskReport, DownloadError>>> = vec![None; total];
        let mut in_flight: HashMap<Id, usize> = HashMap::new();
        let mut workers = JoinSet::new();
        let mut queue = urls.iter().cloned().enumerate();
        let mut completed = 0;

        loop {
            while workers.len() < self.n_workers && !self.cancel.is_cancelled() {
                let Some((index, url)) = queue.next() else {
                    break;
                };
                let task = Arc::clone(&self.task);
                let handle = workers.spawn(async move { task.run(&url, force).await });
                in_flight.insert(handle.id(), index);
            }

            let Some(joined) = workers.join_next_with_id().await else {
                break;
            };
            let (index, result) = match joined {
                Ok((id, result)) => (in_flight.remove(&id), result),
                Err(err) => {
                    warn!(error = %err, "Download worker panicked");
                    (
                        in_flight.remove(&err.id()),
                        Err(DownloadError::worker(err.to_string())),
                    )
                }
            };
            let Some(index) = index else {
                continue;
            };

            if let Err(error) = &result {
                warn!(url = %urls[index], %error, "Download failed");
            }
            slots[index] = Some(result);
            completed += 1;
            self.progress.update(completed, total);
        }

        if self.cancel.is_cancelled() && completed < total {
            info!(
                completed,
                skipped = total - completed,
                "Batch cancelled, remaining URLs were not dispatched"
            );
        }

        let result = collect(urls, slots);
        let summary = result.summary();
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            fetched = summary.fetched,
            "Batch finished"
        );
        self.progress.finish(&summary);
        result
    }
}

/// Pair every URL with its outcome; empty slots were never dispatched.
fn collect(urls: Vec<String>, slots: Vec<Option<Result<TaskReport, DownloadError>>>) -> BatchResult {
    let mut fetched = 0;
    let mut skipped = 0;

    let entries = urls
        .into_iter()
        .zip(slots)
        .map(|(url, slot)| {
            let outcome = match slot {
                Some(Ok(report)) => {
                    if report.fetched {
                        fetched += 1;
                    } else {
                        skipped += 1;
                    }
                    DownloadOutcome::Stored(report.path)
                }
                Some(Err(error)) => DownloadOutcome::Failed(error),
                None => DownloadOutcome::Failed(DownloadError::Cancelled),
            };
            UrlOutcome { url, outcome }
        })
        .collect();

    BatchResult::from_entries(entries, fetched, skipped)
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("task", &self.task)
            .field("n_workers", &self.n_workers)
            .finish_non_exhaustive()
    }
}
