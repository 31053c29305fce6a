//! Per-URL outcomes and batch results.

use std::path::{Path, PathBuf};

use crate::error::DownloadError;

/// Final state of one URL once the batch is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The canonical original is on disk at this path (fetched now or
    /// already present).
    Stored(PathBuf),
    /// Nothing usable was produced; the cause is kept for reporting.
    Failed(DownloadError),
}

impl DownloadOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stored(path) => Some(path),
            Self::Failed(_) => None,
        }
    }

    pub const fn error(&self) -> Option<&DownloadError> {
        match self {
            Self::Stored(_) => None,
            Self::Failed(err) => Some(err),
        }
    }

    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

impl From<Result<PathBuf, DownloadError>> for DownloadOutcome {
    fn from(result: Result<PathBuf, DownloadError>) -> Self {
        match result {
            Ok(path) => Self::Stored(path),
            Err(err) => Self::Failed(err),
        }
    }
}

/// A URL paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlOutcome {
    pub url: String,
    pub outcome: DownloadOutcome,
}

/// Aggregate counters for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// URLs whose original was fetched over the network in this run.
    pub fetched: usize,
    /// URLs whose original already existed and was not re-fetched.
    pub skipped: usize,
}

impl BatchSummary {
    /// Fraction of URLs that ended up stored, `0.0` for an empty batch.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }
}

/// Outcomes of a batch, aligned with the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    entries: Vec<UrlOutcome>,
    summary: BatchSummary,
}

impl BatchResult {
    pub(crate) const fn new(entries: Vec<UrlOutcome>, summary: BatchSummary) -> Self {
        Self { entries, summary }
    }

    /// Build from input-ordered entries plus fetch/skip counters.
    pub fn from_entries(entries: Vec<UrlOutcome>, fetched: usize, skipped: usize) -> Self {
        let succeeded = entries.iter().filter(|e| e.outcome.is_stored()).count();
        let summary = BatchSummary {
            total: entries.len(),
            succeeded,
            failed: entries.len() - succeeded,
            fetched,
            skipped,
        };
        Self::new(entries, summary)
    }

    pub fn entries(&self) -> &[UrlOutcome] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<UrlOutcome> {
        self.entries
    }

    pub const fn summary(&self) -> BatchSummary {
        self.summary
    }

    pub const fn failure_count(&self) -> usize {
        self.summary.failed
    }

    /// Stored paths aligned with the input; `None` where the URL failed.
    pub fn paths(&self) -> Vec<Option<&Path>> {
        self.entries.iter().map(|e| e.outcome.path()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn entry(url: &str, outcome: DownloadOutcome) -> UrlOutcome {
        UrlOutcome {
            url: url.to_string(),
            outcome,
        }
    }

    #[test]
    fn summary_counts_and_ratio() {
        let result = BatchResult::from_entries(
            vec![
                entry("a", DownloadOutcome::Stored(PathBuf::from("/s/a.jpg"))),
                entry(
                    "bad",
                    DownloadOutcome::Failed(FetchError::status("bad", 404).into()),
                ),
                entry("b", DownloadOutcome::Stored(PathBuf::from("/s/b.jpg"))),
            ],
            2,
            0,
        );

        let summary = result.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(format!("{:.2}%", summary.success_ratio() * 100.0), "66.67%");
        assert_eq!(result.paths()[1], None);
        assert_eq!(result.paths()[2], Some(Path::new("/s/b.jpg")));
    }

    #[test]
    fn empty_batch_has_zero_ratio() {
        let result = BatchResult::default();
        assert!(result.is_empty());
        assert!(result.summary().success_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn outcome_from_result() {
        let ok: DownloadOutcome = Ok(PathBuf::from("/x.jpg")).into();
        assert_eq!(ok.path(), Some(Path::new("/x.jpg")));

        let err: DownloadOutcome = Err(DownloadError::Cancelled).into();
        assert_eq!(err.error(), Some(&DownloadError::Cancelled));
        assert!(!err.is_stored());
    }
}
