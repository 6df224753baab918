//! Options for a single process run.

use std::path::PathBuf;
use std::time::Duration;

/// Per-invocation options for the process runner.
///
/// # Example
///
/// ```
/// use whisper_cli_mcp::process::RunOptions;
/// use std::time::Duration;
///
/// let options = RunOptions::default()
///     .with_working_dir("/tmp")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum time allowed before the process is killed.
    pub timeout: Duration,

    /// Working directory; `None` inherits the server's.
    pub working_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            working_dir: None,
        }
    }
}

impl RunOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}
