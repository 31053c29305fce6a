#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;

pub mod error;
pub mod handlers;
pub mod parser;
pub mod progress;

// Re-export primary types for convenient access
pub use error::CliError;
pub use parser::Cli;
pub use progress::{CliProgress, ProgressThrottle};
