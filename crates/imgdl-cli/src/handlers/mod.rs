//! Command handlers.

pub mod report;
pub mod run;
