//! MCP server implementation.
//!
//! This module provides the MCP server that answers `tools/list` and `tools/call` over stdio.

mod handler;

pub use handler::{WhisperServer, run};
