#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod proxy;

// ============================================================================
// Public API
// ============================================================================

// Fetcher
pub use client::ReqwestFetcher;

// Configuration
pub use config::FetchConfig;

// Route selection
pub use proxy::ProxyRotator;

// Silence unused dev-dependency warnings
#[cfg(test)]
use axum as _;
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use tokio_test as _;
