#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod outcome;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{
    DEFAULT_STORE_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, DownloaderConfig,
    DownloaderSettings, HeaderSet, ProxyPool, ProxyRecord, ProxySetting, ThumbSizes,
    ThumbnailSpec, WaitRange, config_file_candidates,
};
pub use error::{ConfigError, DownloadError, FetchError};
pub use outcome::{BatchResult, BatchSummary, DownloadOutcome, UrlOutcome};
pub use paths::{PathResolver, expand_home, url_digest};
pub use ports::{FetchPort, NoopProgress, ProgressReporter};
