//! Error types for the whisper-cli MCP server.
//!
//! Uses thiserror for deriving std::error::Error and miette for rich diagnostics.
//!
//! Only [`Error`] can end the program. Process and tool errors are caught at the
//! dispatcher boundary and reported to the caller as text.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the application.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// MCP server error
    #[error("MCP server error")]
    #[diagnostic(code(wcm::server))]
    Server(#[from] ServerError),
}

/// Errors raised while spawning or supervising an external process.
#[derive(Error, Debug, Diagnostic)]
pub enum ProcessError {
    /// The executable does not exist.
    #[error("failed to spawn {program}: {source}")]
    #[diagnostic(
        code(wcm::process::not_found),
        help("Check that the program is installed and on PATH")
    )]
    NotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The requested working directory is missing or not a directory.
    #[error("working directory {} does not exist", .path.display())]
    #[diagnostic(code(wcm::process::working_directory))]
    WorkingDirectory { path: std::path::PathBuf },

    /// Spawning or waiting on the process failed.
    #[error("{0}")]
    #[diagnostic(code(wcm::process::execution_failed))]
    ExecutionFailed(String),

    /// Captured output was not valid UTF-8.
    #[error("{stream} contains invalid UTF-8")]
    #[diagnostic(code(wcm::process::encoding))]
    OutputEncoding { stream: &'static str },

    /// Nothing to run.
    #[error("invalid command: {0}")]
    #[diagnostic(code(wcm::process::invalid_command))]
    InvalidCommand(String),
}

/// Errors raised while resolving a tool call.
#[derive(Error, Debug, Diagnostic)]
pub enum ToolError {
    /// No tool is registered under this name.
    #[error("Unknown tool: {0}")]
    #[diagnostic(code(wcm::tool::unknown))]
    Unknown(String),

    /// The argument payload does not fit the tool's input schema.
    #[error("Invalid arguments for {tool}: {source}")]
    #[diagnostic(code(wcm::tool::invalid_arguments))]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors related to the MCP server.
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    /// Failed to initialize server
    #[error("Failed to initialize MCP server: {0}")]
    #[diagnostic(code(wcm::server::init))]
    InitializationFailed(String),

    /// Transport error
    #[error("Transport error: {0}")]
    #[diagnostic(code(wcm::server::transport))]
    Transport(String),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_message() {
        let err = ToolError::Unknown("foo".to_string());
        assert_eq!(err.to_string(), "Unknown tool: foo");
    }

    #[test]
    fn test_not_found_names_program() {
        let err = ProcessError::NotFound {
            program: "whisper-cli".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("failed to spawn whisper-cli"));
    }

    #[test]
    fn test_working_directory_names_path() {
        let err = ProcessError::WorkingDirectory {
            path: "/nope/dir".into(),
        };
        assert_eq!(err.to_string(), "working directory /nope/dir does not exist");
    }

    #[test]
    fn test_server_error_converts() {
        let err: Error = ServerError::Transport("closed".to_string()).into();
        assert!(matches!(err, Error::Server(ServerError::Transport(_))));
    }
}
