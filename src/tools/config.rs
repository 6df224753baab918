//! Configuration for the tool dispatcher.

use std::time::Duration;

/// Default transcription executable.
pub const DEFAULT_WHISPER_BINARY: &str = "whisper-cli";

/// Configuration for a [`Dispatcher`](super::Dispatcher).
///
/// # Example
///
/// ```
/// use whisper_cli_mcp::tools::DispatcherConfig;
/// use std::time::Duration;
///
/// let config = DispatcherConfig::default()
///     .with_whisper_binary("/opt/whisper/bin/whisper-cli")
///     .with_shell_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Executable invoked by `whisper_transcribe`.
    pub whisper_binary: String,

    /// Time budget for one transcription.
    pub transcribe_timeout: Duration,

    /// Time budget for one shell command.
    pub shell_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            whisper_binary: String::from(DEFAULT_WHISPER_BINARY),
            transcribe_timeout: Duration::from_secs(300),
            shell_timeout: Duration::from_secs(30),
        }
    }
}

impl DispatcherConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transcription executable.
    #[must_use]
    pub fn with_whisper_binary(mut self, binary: impl Into<String>) -> Self {
        self.whisper_binary = binary.into();
        self
    }

    /// Sets the transcription time budget.
    #[must_use]
    pub fn with_transcribe_timeout(mut self, timeout: Duration) -> Self {
        self.transcribe_timeout = timeout;
        self
    }

    /// Sets the shell command time budget.
    #[must_use]
    pub fn with_shell_timeout(mut self, timeout: Duration) -> Self {
        self.shell_timeout = timeout;
        self
    }
}
