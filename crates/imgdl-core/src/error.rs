//! Error types shared by every imgdl crate.
//!
//! Per-URL failures (`FetchError`, `DownloadError`) are plain values: they are
//! caught at the task boundary and recorded in the batch result, never used to
//! unwind the batch. `ConfigError` is the only error raised eagerly, before
//! any work starts.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single HTTP fetch attempt.
///
/// Every variant carries the requested URL so a log line is self-contained.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-success status code.
    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    /// DNS, connection, TLS, proxy or body read failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// The URL this attempt was made for.
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }

    /// HTTP status code, when the server answered at all.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Terminal failure of one URL.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DownloadError {
    /// The image could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The payload is not a decodable image.
    #[error("cannot decode image: {message}")]
    Decode { message: String },

    /// The encoded image could not be written to disk.
    #[error("cannot write {}: {message}", path.display())]
    Persist { path: PathBuf, message: String },

    /// The batch was cancelled before this URL was dispatched.
    #[error("download cancelled")]
    Cancelled,

    /// The worker running this URL panicked or was aborted.
    #[error("worker failed: {message}")]
    Worker { message: String },
}

impl DownloadError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn persist(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Persist {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Whether a later run (with `force`) could plausibly succeed.
    ///
    /// Network failures are transient; an undecodable payload will stay
    /// undecodable.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::Persist { .. } | Self::Cancelled | Self::Worker { .. }
        )
    }
}

/// Invalid configuration, detected before any URL is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("n_workers must be at least 1")]
    ZeroWorkers,

    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("wait bounds must satisfy 0 <= min_wait <= max_wait, got [{min}, {max}]")]
    InvalidWaitRange { min: f64, max: f64 },

    #[error("invalid proxy {proxy:?}: {reason}")]
    InvalidProxy { proxy: String, reason: String },

    #[error("invalid thumbnail size {spec:?}: {reason}")]
    InvalidThumbnail { spec: String, reason: String },

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("store path cannot be empty")]
    EmptyStorePath,

    #[error("cannot prepare store directory {}: {reason}", path.display())]
    StoreDirectory { path: PathBuf, reason: String },

    #[error("cannot read config file {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },

    #[error("cannot determine home directory")]
    NoHomeDir,
}
