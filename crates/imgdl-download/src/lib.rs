#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod downloader;
pub mod jitter;
pub mod normalize;
pub mod persist;
mod runner;
mod task;

#[cfg(test)]
mod testing;

// ============================================================================
// Public API
// ============================================================================

pub use downloader::{ImageDownloader, build_downloader};
pub use jitter::RateJitter;
pub use runner::BatchRunner;
pub use task::{DownloadTask, TaskReport, ThumbnailFailure};

// Re-export core types for convenience
pub use imgdl_core::{
    BatchResult, BatchSummary, DownloadError, DownloadOutcome, DownloaderConfig, FetchPort,
    ProgressReporter, UrlOutcome,
};
