//! Downloader configuration.
//!
//! Configuration arrives in loose shapes (see [`DownloaderSettings`]) from
//! files, environment and flags. It is resolved exactly once into a
//! [`DownloaderConfig`], whose fields each have a single canonical form.
//! Everything downstream reads the resolved value and never mutates it.

mod headers;
mod proxy;
mod settings;
mod thumbs;

use std::path::PathBuf;
use std::time::Duration;

pub use headers::{DEFAULT_USER_AGENT, HeaderSet};
pub use proxy::{ProxyPool, ProxyRecord};
pub use settings::{DownloaderSettings, ProxySetting, ThumbSizes, config_file_candidates};
pub use thumbs::ThumbnailSpec;

use crate::error::ConfigError;

/// Default store location, relative to the home directory.
pub const DEFAULT_STORE_PATH: &str = "~/.imgdl/images";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Bounds of the random pause taken after each network fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitRange {
    min: Duration,
    max: Duration,
}

impl WaitRange {
    /// Build from seconds, rejecting negative, non-finite or inverted bounds.
    pub fn from_secs(min: f64, max: f64) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidWaitRange { min, max };
        if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
            return Err(invalid());
        }
        Ok(Self {
            min: Duration::try_from_secs_f64(min).map_err(|_| invalid())?,
            max: Duration::try_from_secs_f64(max).map_err(|_| invalid())?,
        })
    }

    pub const fn min(&self) -> Duration {
        self.min
    }

    pub const fn max(&self) -> Duration {
        self.max
    }

    /// True when no pause is ever taken.
    pub const fn is_zero(&self) -> bool {
        self.max.is_zero()
    }
}

/// Fully resolved, validated configuration for one run.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Root directory of the content-addressed store.
    pub store_path: PathBuf,
    /// Number of URLs processed concurrently (always >= 1).
    pub n_workers: usize,
    /// Re-fetch and rewrite even when files already exist.
    pub force: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Thumbnail variants to derive; empty means none.
    pub thumbnails: Vec<ThumbnailSpec>,
    /// Random pause after every network fetch.
    pub wait: WaitRange,
    /// Proxies sampled per request.
    pub proxies: ProxyPool,
    /// Request headers, `User-Agent` already applied.
    pub headers: HeaderSet,
}

impl DownloaderConfig {
    /// Resolve built-in defaults only.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        DownloaderSettings::default().resolve()
    }

    /// Default worker count: one per logical CPU.
    pub fn default_workers() -> usize {
        num_cpus::get().max(1)
    }
}

pub(crate) fn timeout_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidTimeout(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(secs))
}
