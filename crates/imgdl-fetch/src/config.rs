//! Public configuration for the fetcher.

use std::time::Duration;

use imgdl_core::{DEFAULT_TIMEOUT_SECS, DownloaderConfig, HeaderSet, ProxyPool};

/// Configuration for [`ReqwestFetcher`](crate::ReqwestFetcher).
///
/// # Example
///
/// ```
/// use imgdl_fetch::FetchConfig;
/// use std::time::Duration;
///
/// let config = FetchConfig::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-crawler/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout, body included
    pub(crate) timeout: Duration,
    /// Headers sent with every request
    pub(crate) headers: HeaderSet,
    /// Proxies sampled per request
    pub(crate) proxies: ProxyPool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            headers: HeaderSet::defaults(),
            proxies: ProxyPool::direct(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the network-related part of a resolved downloader configuration.
    #[must_use]
    pub fn from_downloader(config: &DownloaderConfig) -> Self {
        Self {
            timeout: config.timeout,
            headers: config.headers.clone(),
            proxies: config.proxies.clone(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the whole header set.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.headers = self.headers.with_user_agent(user_agent);
        self
    }

    #[must_use]
    pub fn with_proxies(mut self, proxies: ProxyPool) -> Self {
        self.proxies = proxies;
        self
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
