//! whisper-cli MCP server - Entry Point
//!
//! This is the main entry point for the MCP server binary.

use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use whisper_cli_mcp::{server, tools::DEFAULT_WHISPER_BINARY, tools::DispatcherConfig};

/// whisper-cli MCP server - audio transcription and shell commands for AI agents.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transcription executable to invoke
    #[arg(long, default_value = DEFAULT_WHISPER_BINARY)]
    whisper_binary: String,

    /// Time budget for one transcription, in seconds
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    transcribe_timeout: u64,

    /// Time budget for one shell command, in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    shell_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // MCP requires that logs go to stderr (stdout is for JSON-RPC)
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("whisper-cli MCP server v{}", env!("CARGO_PKG_VERSION"));

    let config = DispatcherConfig::new()
        .with_whisper_binary(args.whisper_binary)
        .with_transcribe_timeout(Duration::from_secs(args.transcribe_timeout))
        .with_shell_timeout(Duration::from_secs(args.shell_timeout));

    info!(
        whisper_binary = %config.whisper_binary,
        transcribe_timeout_s = config.transcribe_timeout.as_secs(),
        shell_timeout_s = config.shell_timeout.as_secs(),
        "Configuration loaded"
    );

    server::run(config).await.into_diagnostic()
}
