//! whisper-cli MCP server.
//!
//! This crate exposes two tools over the Model Context Protocol on stdio:
//!
//! - `whisper_transcribe` runs the `whisper-cli` binary on an audio file
//! - `shell_command` runs a command through the platform shell
//!
//! Every call spawns at most one process with a hard time budget (300 seconds for
//! transcription, 30 seconds for shell commands by default). Shell commands are first screened
//! by a substring denylist, which is advisory only and not a security boundary.
//!
//! # Example
//!
//! ```no_run
//! use whisper_cli_mcp::{server, tools::DispatcherConfig};
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     server::run(DispatcherConfig::default()).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod process;
pub mod server;
pub mod tools;

// Re-export commonly used types
pub use error::{Error, Result};
pub use process::{ProcessResult, ProcessRunner, SystemRunner};
pub use tools::{Dispatcher, DispatcherConfig, ToolResponse};
