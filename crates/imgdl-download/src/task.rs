//! Per-URL pipeline.
//!
//! ```text
//! check original ─┬─ exists, !force ──────────────────────────┐
//!                 └─ fetch ─ decode+normalize ─ persist ──────┤
//!                                                             ▼
//!                        for each thumbnail: check ─┬─ exists, !force: skip
//!                                                   └─ fit ─ encode ─ persist
//! ```
//!
//! A failure before the original is persisted aborts the URL. Thumbnail
//! failures are recorded and logged but never fail the URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, warn};

use imgdl_core::{DownloadError, FetchPort, PathResolver, ThumbnailSpec};

use crate::jitter::RateJitter;
use crate::normalize;
use crate::persist::write_atomic;

/// A thumbnail that could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailFailure {
    pub name: String,
    pub error: DownloadError,
}

/// What one successful task did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// Where the canonical original lives.
    pub path: PathBuf,
    /// Whether the original was fetched in this run (false when it was
    /// already on disk).
    pub fetched: bool,
    pub thumbnails_written: usize,
    pub thumbnail_failures: Vec<ThumbnailFailure>,
}

impl TaskReport {
    const fn new(path: PathBuf, fetched: bool) -> Self {
        Self {
            path,
            fetched,
            thumbnails_written: 0,
            thumbnail_failures: Vec::new(),
        }
    }
}

/// Pixels thumbnails are derived from.
enum Source {
    /// Just fetched and normalized in this task.
    Fresh(Arc<RgbImage>),
    /// Already on disk; decoded on first use and cached, failure included.
    Stored {
        path: PathBuf,
        loaded: Option<Result<Arc<RgbImage>, DownloadError>>,
    },
}

impl Source {
    const fn stored(path: PathBuf) -> Self {
        Self::Stored { path, loaded: None }
    }

    async fn pixels(&mut self) -> Result<Arc<RgbImage>, DownloadError> {
        match self {
            Self::Fresh(pixels) => Ok(Arc::clone(pixels)),
            Self::Stored { path, loaded } => {
                if let Some(result) = loaded {
                    return result.clone();
                }
                let path = path.clone();
                let result = blocking(move || load_stored(&path)).await.map(Arc::new);
                *loaded = Some(result.clone());
                result
            }
        }
    }
}

fn load_stored(path: &Path) -> Result<RgbImage, DownloadError> {
    let bytes = std::fs::read(path).map_err(|e| {
        DownloadError::decode(format!("cannot read stored original {}: {e}", path.display()))
    })?;
    Ok(normalize::canonicalize(&normalize::decode(&bytes)?))
}

/// Run CPU-bound or filesystem work on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, DownloadError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DownloadError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DownloadError::worker(e.to_string()))?
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

/// Everything needed to process one URL, shared read-only by all workers.
pub struct DownloadTask {
    fetcher: Arc<dyn FetchPort>,
    paths: PathResolver,
    thumbnails: Vec<ThumbnailSpec>,
    jitter: RateJitter,
}

impl DownloadTask {
    pub fn new(
        fetcher: Arc<dyn FetchPort>,
        paths: PathResolver,
        thumbnails: Vec<ThumbnailSpec>,
        jitter: RateJitter,
    ) -> Self {
        Self {
            fetcher,
            paths,
            thumbnails,
            jitter,
        }
    }

    pub const fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn thumbnails(&self) -> &[ThumbnailSpec] {
        &self.thumbnails
    }

    /// Make sure the original (and every thumbnail) for `url` is on disk.
    ///
    /// With `force`, existing files are ignored and rewritten. After a network
    /// fetch, successful or not, the task pauses for a jittered delay before
    /// returning.
    pub async fn run(&self, url: &str, force: bool) -> Result<TaskReport, DownloadError> {
        let path = self.paths.image_path(url);

        if !force && is_file(&path).await {
            debug!(url, path = %path.display(), "Original already stored, skipping fetch");
            let report = TaskReport::new(path.clone(), false);
            return Ok(self
                .write_thumbnails(url, force, Source::stored(path), report)
                .await);
        }

        let result = match self.fetch_original(url, &path).await {
            Ok(pixels) => {
                let report = TaskReport::new(path, true);
                Ok(self
                    .write_thumbnails(url, force, Source::Fresh(pixels), report)
                    .await)
            }
            Err(err) => Err(err),
        };

        self.jitter.pause().await;
        result
    }

    async fn fetch_original(&self, url: &str, path: &Path) -> Result<Arc<RgbImage>, DownloadError> {
        let body = self.fetcher.fetch(url).await?;
        debug!(url, bytes = body.len(), "Fetched");

        let target = path.to_path_buf();
        let pixels = blocking(move || {
            let pixels = normalize::canonicalize(&normalize::decode(&body)?);
            let jpeg = normalize::encode_jpeg(&pixels)?;
            write_atomic(&target, &jpeg)?;
            Ok(pixels)
        })
        .await?;

        debug!(url, path = %path.display(), "Stored original");
        Ok(Arc::new(pixels))
    }

    async fn write_thumbnails(
        &self,
        url: &str,
        force: bool,
        mut source: Source,
        mut report: TaskReport,
    ) -> TaskReport {
        for spec in &self.thumbnails {
            let thumb_path = self.paths.thumb_path(url, &spec.name);
            if !force && is_file(&thumb_path).await {
                continue;
            }

            let result = match source.pixels().await {
                Ok(pixels) => write_thumbnail(pixels, spec.clone(), thumb_path).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(()) => report.thumbnails_written += 1,
                Err(error) => {
                    warn!(url, thumbnail = %spec, %error, "Thumbnail failed");
                    report.thumbnail_failures.push(ThumbnailFailure {
                        name: spec.name.clone(),
                        error,
                    });
                }
            }
        }
        report
    }
}

async fn write_thumbnail(
    pixels: Arc<RgbImage>,
    spec: ThumbnailSpec,
    path: PathBuf,
) -> Result<(), DownloadError> {
    blocking(move || {
        let jpeg = normalize::encode_jpeg(&normalize::thumbnail(&pixels, &spec))?;
        write_atomic(&path, &jpeg)
    })
    .await
}

impl std::fmt::Debug for DownloadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadTask")
            .field("store", &self.paths.root())
            .field("thumbnails", &self.thumbnails)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}
