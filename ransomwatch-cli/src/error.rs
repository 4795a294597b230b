//! CLI-specific error types and exit code mapping

use ransomwatch_core::error::RansomwatchError;
use ransomwatch_detector::DetectorError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Alerts could not be persisted or read back.
    #[error("output error: {0}")]
    Output(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration error                       |
    /// | 10   | IO error (including alerts persistence)   |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) | Self::Output(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<RansomwatchError> for CliError {
    fn from(e: RansomwatchError) -> Self {
        match e {
            RansomwatchError::Config(err) => Self::Config(err.to_string()),
            RansomwatchError::Output(err) => Self::Output(err.to_string()),
            RansomwatchError::Io(err) => Self::Io(err),
            RansomwatchError::Detection(err) => Self::Command(err.to_string()),
        }
    }
}

impl From<DetectorError> for CliError {
    fn from(e: DetectorError) -> Self {
        RansomwatchError::from(e).into()
    }
}
