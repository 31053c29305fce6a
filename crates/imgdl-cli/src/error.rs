//! CLI-specific error types and exit codes.

use imgdl_core::ConfigError;
use thiserror::Error;

/// Errors that stop the CLI before or after a batch.
///
/// Per-URL download failures are not errors at this level: they are counted,
/// reported and the process still exits successfully.
#[derive(Debug, Error)]
pub enum CliError {
    /// IO error (URL file unreadable, report not writable, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow sysexits.h (usage errors exit with 2 from the
    /// argument parser itself):
    /// - 74: EX_IOERR
    /// - 78: EX_CONFIG
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) => 74,
            Self::Config(_) => 78,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Io("x".into()).exit_code(), 74);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
    }

    #[test]
    fn test_config_error_maps_to_config() {
        let err: CliError = ConfigError::ZeroWorkers.into();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: n_workers must be at least 1");
    }
}
