//! Tool registry, shell command filter and the dispatcher that ties them to the process runner.
//!
//! # Example
//!
//! ```no_run
//! use whisper_cli_mcp::tools::{Dispatcher, DispatcherConfig};
//!
//! # async fn demo() {
//! let dispatcher = Dispatcher::new(DispatcherConfig::default());
//!
//! let mut arguments = serde_json::Map::new();
//! arguments.insert("command".into(), "echo hello".into());
//!
//! let response = dispatcher.call_tool("shell_command", Some(arguments)).await;
//! println!("{}", response.blocks[0]);
//! # }
//! ```

mod config;
mod dispatcher;
pub mod registry;
pub mod validator;

pub use config::{DEFAULT_WHISPER_BINARY, DispatcherConfig};
pub use dispatcher::{Dispatcher, ShellArgs, ToolCall, ToolResponse, TranscribeArgs};
pub use registry::{SHELL_COMMAND, ToolDescriptor, WHISPER_TRANSCRIBE};
pub use validator::{DENYLIST, Decision};
