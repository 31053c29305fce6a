//! `reqwest` implementation of the fetch port.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::trace;

use imgdl_core::{ConfigError, FetchError, FetchPort, HeaderSet, ProxyRecord};

use crate::config::FetchConfig;
use crate::error::{classify, invalid_header, invalid_proxy};
use crate::proxy::ProxyRotator;

/// One way of reaching the network: direct, or through one proxy.
///
/// `reqwest` binds proxies to a client, so every proxy gets its own client;
/// each client keeps its own connection pool and is shared by all workers.
#[derive(Debug)]
struct Route {
    proxy: Option<ProxyRecord>,
    client: reqwest::Client,
}

impl Route {
    fn label(&self) -> &str {
        self.proxy.as_ref().map_or("direct", ProxyRecord::url)
    }
}

/// Production fetcher.
///
/// Every request gets the configured timeout and headers, and goes through a
/// proxy drawn uniformly at random from the configured pool (or directly when
/// the pool is empty). Non-2xx answers are failures.
#[derive(Debug)]
pub struct ReqwestFetcher {
    routes: ProxyRotator<Route>,
}

impl ReqwestFetcher {
    /// Build one client per route.
    ///
    /// Proxies and headers `reqwest` cannot use are rejected here, before any
    /// request is made.
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        let headers = header_map(&config.headers)?;

        let routes = if config.proxies.is_direct() {
            vec![build_route(config, &headers, None)?]
        } else {
            config
                .proxies
                .records()
                .iter()
                .map(|record| build_route(config, &headers, Some(record.clone())))
                .collect::<Result<Vec<_>, _>>()?
        };

        let routes = ProxyRotator::new(routes).ok_or_else(|| ConfigError::InvalidProxy {
            proxy: String::new(),
            reason: "no usable route".to_string(),
        })?;
        Ok(Self { routes })
    }

    /// Number of distinct routes (1 when direct).
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

fn build_route(
    config: &FetchConfig,
    headers: &HeaderMap,
    proxy: Option<ProxyRecord>,
) -> Result<Route, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .default_headers(headers.clone());

    if let Some(record) = &proxy {
        // Proxy::all routes both http:// and https:// targets
        let route = reqwest::Proxy::all(record.url()).map_err(|e| invalid_proxy(record.url(), &e))?;
        builder = builder.proxy(route);
    }

    let client = builder.build().map_err(|e| ConfigError::InvalidProxy {
        proxy: proxy
            .as_ref()
            .map_or_else(String::new, |record| record.url().to_string()),
        reason: format!("cannot build HTTP client: {e}"),
    })?;

    Ok(Route { proxy, client })
}

fn header_map(headers: &HeaderSet) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid_header(name, e))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid_header(name, e))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[async_trait]
impl FetchPort for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let route = self.routes.pick();
        trace!(url, route = route.label(), "Fetching");

        let response = route
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        response.bytes().await.map_err(|e| classify(url, &e))
    }
}
