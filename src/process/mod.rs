//! External process execution with captured output and a hard time budget.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use whisper_cli_mcp::process::{Invocation, ProcessRunner, RunOptions, SystemRunner};
//!
//! let options = RunOptions::default().with_timeout(Duration::from_secs(5));
//! let invocation = Invocation::shell("echo hello", options);
//!
//! let result = SystemRunner.run(&invocation).unwrap();
//! assert!(result.success());
//! println!("Output: {}", result.stdout);
//! ```

mod config;
mod runner;

pub use config::RunOptions;
pub use runner::{CommandLine, Invocation, ProcessResult, ProcessRunner, SystemRunner};
