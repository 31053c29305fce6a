//! Public entry point: one configured downloader for single URLs or batches.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use imgdl_core::{
    BatchResult, ConfigError, DownloadError, DownloaderConfig, FetchPort, PathResolver,
    ProgressReporter,
};
use imgdl_fetch::{FetchConfig, ReqwestFetcher};

use crate::jitter::RateJitter;
use crate::runner::BatchRunner;
use crate::task::DownloadTask;

/// Downloads images into a content-addressed store.
///
/// Built once per run from a resolved [`DownloaderConfig`]; the store and
/// thumbnail directories exist as soon as construction succeeds.
///
/// The configured `force` flag applies to every call; the `force` argument of
/// [`download`](Self::download) and [`download_all`](Self::download_all) can
/// only turn it on, never off.
#[derive(Debug)]
pub struct ImageDownloader {
    runner: BatchRunner,
    force: bool,
}

impl ImageDownloader {
    /// Prepare the store and wire the pipeline around `fetcher`.
    pub fn new(config: &DownloaderConfig, fetcher: Arc<dyn FetchPort>) -> Result<Self, ConfigError> {
        let paths = PathResolver::create(&config.store_path, &config.thumbnails)?;
        info!(
            store = %paths.root().display(),
            workers = config.n_workers,
            thumbnails = config.thumbnails.len(),
            proxies = config.proxies.len(),
            "Downloader ready"
        );

        let task = DownloadTask::new(
            fetcher,
            paths,
            config.thumbnails.clone(),
            RateJitter::new(config.wait),
        );
        Ok(Self {
            runner: BatchRunner::new(Arc::new(task), config.n_workers),
            force: config.force,
        })
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.runner = self.runner.with_progress(progress);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.runner = self.runner.with_cancellation(cancel);
        self
    }

    pub fn paths(&self) -> &PathResolver {
        self.runner.task().paths()
    }

    /// Download one URL, returning the path of the stored original.
    pub async fn download(&self, url: &str, force: bool) -> Result<PathBuf, DownloadError> {
        self.runner
            .task()
            .run(url, force || self.force)
            .await
            .map(|report| report.path)
    }

    /// Download every URL, returning outcomes aligned with the input.
    pub async fn download_all<I, S>(&self, urls: I, force: bool) -> BatchResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner.run(urls, force || self.force).await
    }
}

/// Build a downloader backed by the `reqwest` fetcher.
///
/// Proxy, header and store problems all surface here, before any URL is
/// touched.
pub fn build_downloader(config: &DownloaderConfig) -> Result<ImageDownloader, ConfigError> {
    let fetcher = ReqwestFetcher::new(&FetchConfig::from_downloader(config))?;
    ImageDownloader::new(config, Arc::new(fetcher))
}
