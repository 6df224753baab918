//! Routes tool calls to their handlers and turns every outcome into text.
//!
//! The dispatcher never fails at the protocol level: unknown tools, bad arguments, blocked
//! commands, spawn failures and timeouts all come back as a single text block.

use std::sync::Arc;
use std::time::Duration;

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::DispatcherConfig;
use super::registry::{self, SHELL_COMMAND, ToolDescriptor, WHISPER_TRANSCRIBE};
use super::validator::{self, Decision};
use crate::error::{ProcessError, ToolError};
use crate::process::{Invocation, ProcessResult, ProcessRunner, RunOptions, SystemRunner};

const BLOCKED_MESSAGE: &str = "Command contains potentially dangerous operations and was blocked.";
const WHISPER_NOT_FOUND_MESSAGE: &str = "whisper command not found. Please install OpenAI Whisper.";

/// Arguments of `whisper_transcribe`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscribeArgs {
    pub audio_file: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

fn default_model() -> String {
    String::from("base")
}

fn default_output_format() -> String {
    String::from("txt")
}

impl TranscribeArgs {
    /// Builds the transcription command line for `binary`.
    ///
    /// `--language` is only added when a non-empty language was given.
    #[must_use]
    pub fn to_argv(&self, binary: &str) -> Vec<String> {
        let mut argv = vec![
            binary.to_string(),
            self.audio_file.clone(),
            "--model".to_string(),
            self.model.clone(),
            "--output_format".to_string(),
            self.output_format.clone(),
        ];
        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            argv.push("--language".to_string());
            argv.push(language.to_string());
        }
        argv
    }
}

/// Arguments of `shell_command`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShellArgs {
    pub command: String,
    #[serde(default)]
    pub working_directory: Option<String>,
}

/// A tool call whose name was recognised and whose arguments were parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Transcribe(TranscribeArgs),
    Shell(ShellArgs),
}

impl ToolCall {
    /// Resolves a tool name and its raw argument object.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Unknown` for unregistered names and `ToolError::InvalidArguments` when
    /// the arguments do not match the tool's schema.
    pub fn parse(name: &str, arguments: Option<JsonObject>) -> Result<Self, ToolError> {
        let arguments = Value::Object(arguments.unwrap_or_default());
        match name {
            WHISPER_TRANSCRIBE => serde_json::from_value(arguments)
                .map(Self::Transcribe)
                .map_err(|source| ToolError::InvalidArguments {
                    tool: WHISPER_TRANSCRIBE,
                    source,
                }),
            SHELL_COMMAND => serde_json::from_value(arguments)
                .map(Self::Shell)
                .map_err(|source| ToolError::InvalidArguments {
                    tool: SHELL_COMMAND,
                    source,
                }),
            other => Err(ToolError::Unknown(other.to_string())),
        }
    }
}

/// Ordered text blocks returned for one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub blocks: Vec<String>,
}

impl ToolResponse {
    /// A response made of a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![text.into()],
        }
    }
}

impl From<ToolResponse> for CallToolResult {
    fn from(response: ToolResponse) -> Self {
        CallToolResult::success(response.blocks.into_iter().map(Content::text).collect())
    }
}

/// Stateless tool dispatcher.
///
/// Each call validates, runs one process on the blocking thread pool and formats the outcome.
/// Nothing is shared between calls apart from the immutable configuration.
#[derive(Debug)]
pub struct Dispatcher<R = SystemRunner> {
    config: DispatcherConfig,
    runner: Arc<R>,
}

impl Dispatcher<SystemRunner> {
    /// Creates a dispatcher that spawns real processes.
    #[must_use]
    pub fn new(config: DispatcherConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R> Dispatcher<R>
where
    R: ProcessRunner + 'static,
{
    /// Creates a dispatcher on top of a custom runner.
    #[must_use]
    pub fn with_runner(config: DispatcherConfig, runner: R) -> Self {
        Self {
            config,
            runner: Arc::new(runner),
        }
    }

    /// Returns a reference to the dispatcher configuration.
    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Returns a reference to the process runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The advertised tools, in stable order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        registry::tools()
    }

    /// Handles one tool call. Always returns exactly one text block.
    #[instrument(skip(self, name, arguments), fields(tool = %name))]
    pub async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> ToolResponse {
        let text = match ToolCall::parse(name, arguments) {
            Ok(ToolCall::Transcribe(args)) => self.transcribe(args).await,
            Ok(ToolCall::Shell(args)) => self.shell(args).await,
            Err(e) => {
                warn!(error = %e, "Rejected tool call");
                e.to_string()
            }
        };
        ToolResponse::text(text)
    }

    async fn transcribe(&self, args: TranscribeArgs) -> String {
        let argv = args.to_argv(&self.config.whisper_binary);
        debug!(?argv, "Running transcription");

        let options = RunOptions::default().with_timeout(self.config.transcribe_timeout);
        let outcome = self.run(Invocation::argv(argv, options)).await;
        format_transcription(outcome, self.config.transcribe_timeout)
    }

    async fn shell(&self, args: ShellArgs) -> String {
        if let Decision::Blocked(pattern) = validator::validate(&args.command) {
            warn!(pattern, "Refusing to run shell command");
            return BLOCKED_MESSAGE.to_string();
        }

        let mut options = RunOptions::default().with_timeout(self.config.shell_timeout);
        if let Some(dir) = args.working_directory {
            options = options.with_working_dir(dir);
        }
        debug!(command = %args.command, "Running shell command");

        let outcome = self.run(Invocation::shell(args.command, options)).await;
        format_shell(outcome, self.config.shell_timeout)
    }

    /// Runs the invocation on tokio's blocking pool so the protocol loop keeps serving.
    async fn run(&self, invocation: Invocation) -> Result<ProcessResult, ProcessError> {
        let runner = Arc::clone(&self.runner);
        tokio::task::spawn_blocking(move || runner.run(&invocation))
            .await
            .map_err(|e| ProcessError::ExecutionFailed(format!("process runner task failed: {e}")))?
    }
}

fn format_transcription(outcome: Result<ProcessResult, ProcessError>, timeout: Duration) -> String {
    match outcome {
        Ok(result) if result.timed_out => {
            format!("Transcription timed out after {}", describe_duration(timeout))
        }
        Ok(result) if result.exit_code == 0 => format!(
            "Transcription successful!\n\nStdout:\n{}\n\nStderr:\n{}",
            result.stdout, result.stderr
        ),
        Ok(result) => format!(
            "Transcription failed with exit code {}\n\nStderr:\n{}",
            result.exit_code, result.stderr
        ),
        Err(ProcessError::NotFound { .. }) => WHISPER_NOT_FOUND_MESSAGE.to_string(),
        Err(e) => format!("Error during transcription: {e}"),
    }
}

fn format_shell(outcome: Result<ProcessResult, ProcessError>, timeout: Duration) -> String {
    match outcome {
        Ok(result) if result.timed_out => {
            format!("Command timed out after {}", describe_duration(timeout))
        }
        Ok(result) => {
            let mut output = format!("Exit code: {}\n\n", result.exit_code);
            if !result.stdout.is_empty() {
                output.push_str(&format!("Stdout:\n{}\n\n", result.stdout));
            }
            if !result.stderr.is_empty() {
                output.push_str(&format!("Stderr:\n{}", result.stderr));
            }
            output
        }
        Err(e) => format!("Error executing command: {e}"),
    }
}

/// "5 minutes", "30 seconds", "1 minute", "250 milliseconds".
fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 || duration.subsec_nanos() != 0 {
        return plural(duration.as_millis(), "millisecond");
    }
    if secs % 60 == 0 {
        plural(u128::from(secs / 60), "minute")
    } else {
        plural(u128::from(secs), "second")
    }
}

fn plural(count: u128, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Option<JsonObject> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn finished(exit_code: i32, stdout: &str, stderr: &str) -> Result<ProcessResult, ProcessError> {
        Ok(ProcessResult {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            timed_out: false,
        })
    }

    fn timed_out() -> Result<ProcessResult, ProcessError> {
        Ok(ProcessResult {
            exit_code: -9,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        })
    }

    #[test]
    fn test_parse_transcribe_defaults() {
        let call = ToolCall::parse(WHISPER_TRANSCRIBE, args(json!({"audio_file": "a.wav"}))).unwrap();
        assert_eq!(
            call,
            ToolCall::Transcribe(TranscribeArgs {
                audio_file: "a.wav".into(),
                model: "base".into(),
                language: None,
                output_format: "txt".into(),
            })
        );
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = ToolCall::parse("foo", None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: foo");
    }

    #[test]
    fn test_parse_missing_required_argument() {
        let err = ToolCall::parse(SHELL_COMMAND, None).unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArguments {
                tool: SHELL_COMMAND,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Invalid arguments for shell_command:"));
    }

    #[test]
    fn test_argv_without_language() {
        let args = TranscribeArgs {
            audio_file: "talk.mp3".into(),
            model: "large-v3".into(),
            language: None,
            output_format: "srt".into(),
        };
        assert_eq!(
            args.to_argv("whisper-cli"),
            [
                "whisper-cli",
                "talk.mp3",
                "--model",
                "large-v3",
                "--output_format",
                "srt"
            ]
        );
    }

    #[test]
    fn test_argv_empty_language_skipped() {
        let args = TranscribeArgs {
            audio_file: "talk.mp3".into(),
            model: "base".into(),
            language: Some(String::new()),
            output_format: "txt".into(),
        };
        assert!(!args.to_argv("whisper-cli").contains(&"--language".to_string()));
    }

    #[test]
    fn test_transcription_messages() {
        let timeout = Duration::from_secs(300);
        assert_eq!(
            format_transcription(finished(0, "hello", "progress"), timeout),
            "Transcription successful!\n\nStdout:\nhello\n\nStderr:\nprogress"
        );
        assert_eq!(
            format_transcription(finished(2, "", "bad file"), timeout),
            "Transcription failed with exit code 2\n\nStderr:\nbad file"
        );
        assert_eq!(
            format_transcription(timed_out(), timeout),
            "Transcription timed out after 5 minutes"
        );
        assert_eq!(
            format_transcription(
                Err(ProcessError::ExecutionFailed("boom".into())),
                timeout
            ),
            "Error during transcription: boom"
        );
    }

    #[test]
    fn test_shell_sections() {
        let timeout = Duration::from_secs(30);
        assert_eq!(
            format_shell(finished(0, "hello\n", ""), timeout),
            "Exit code: 0\n\nStdout:\nhello\n\n\n"
        );
        assert_eq!(
            format_shell(finished(1, "", "nope\n"), timeout),
            "Exit code: 1\n\nStderr:\nnope\n"
        );
        assert_eq!(format_shell(finished(0, "", ""), timeout), "Exit code: 0\n\n");
        assert_eq!(
            format_shell(timed_out(), timeout),
            "Command timed out after 30 seconds"
        );
    }

    #[test]
    fn test_describe_duration() {
        assert_eq!(describe_duration(Duration::from_secs(300)), "5 minutes");
        assert_eq!(describe_duration(Duration::from_secs(60)), "1 minute");
        assert_eq!(describe_duration(Duration::from_secs(30)), "30 seconds");
        assert_eq!(describe_duration(Duration::from_secs(1)), "1 second");
        assert_eq!(describe_duration(Duration::from_millis(1500)), "1500 milliseconds");
    }

    #[test]
    fn test_response_into_call_tool_result() {
        let result: CallToolResult = ToolResponse::text("Unknown tool: foo").into();
        assert_eq!(result.content.len(), 1);
        assert_ne!(result.is_error, Some(true));
    }
}
