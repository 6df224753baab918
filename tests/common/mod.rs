//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::{Map, Value};
use whisper_cli_mcp::error::ProcessError;
use whisper_cli_mcp::process::{Invocation, ProcessResult, ProcessRunner};

type Reply = Box<dyn Fn(&Invocation) -> Result<ProcessResult, ProcessError> + Send + Sync>;

/// A runner that records every invocation instead of spawning anything.
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
    reply: Reply,
}

impl RecordingRunner {
    /// Every run "exits" with the given code and output.
    pub fn exiting(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        let (stdout, stderr) = (stdout.to_string(), stderr.to_string());
        Self::replying(move |_| {
            Ok(ProcessResult {
                exit_code,
                stdout: stdout.clone(),
                stderr: stderr.clone(),
                timed_out: false,
            })
        })
    }

    /// Every run hits its time budget.
    pub fn timing_out() -> Self {
        Self::replying(|_| {
            Ok(ProcessResult {
                exit_code: -9,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
            })
        })
    }

    pub fn replying<F>(reply: F) -> Self
    where
        F: Fn(&Invocation) -> Result<ProcessResult, ProcessError> + Send + Sync + 'static,
    {
        Self {
            invocations: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessResult, ProcessError> {
        self.invocations.lock().unwrap().push(invocation.clone());
        (self.reply)(invocation)
    }
}

/// Builds a tool argument object from a `json!` literal.
pub fn arguments(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => panic!("tool arguments must be an object, got {other}"),
    }
}
