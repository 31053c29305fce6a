//! Mapping of `reqwest` failures onto the core fetch error.
//!
//! `reqwest::Error` never crosses the crate boundary; callers only see
//! `FetchError`.

use std::error::Error as _;

use imgdl_core::{ConfigError, FetchError};

/// Classify a transport-level failure for `url`.
pub(crate) fn classify(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::timeout(url);
    }
    if let Some(status) = err.status() {
        return FetchError::status(url, status.as_u16());
    }
    FetchError::transport(url, error_chain(err))
}

/// Render an error with all of its sources, outermost first.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// A proxy `reqwest` refuses to use.
pub(crate) fn invalid_proxy(proxy: &str, err: &reqwest::Error) -> ConfigError {
    ConfigError::InvalidProxy {
        proxy: proxy.to_string(),
        reason: err.to_string(),
    }
}

/// A header `reqwest` refuses to send.
pub(crate) fn invalid_header(name: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidHeader {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
