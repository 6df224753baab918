//! Process runner built on `std::process`.
//!
//! # Notes on stdout/stderr capture and timeouts
//!
//! Do not read stdout/stderr only after process exit: if the child writes enough data to fill a pipe,
//! the child can block forever and never exit (deadlock). Both streams are drained on reader threads
//! while the child runs.
//!
//! Timeouts are enforced here with millisecond precision: completion is polled with `try_wait`, and
//! on expiry the child is hard-killed (SIGKILL) and reaped. On Unix the child is spawned as the leader
//! of a new process group and the whole group is signalled, so a shell's own children do not outlive
//! the budget either.
//!
//! A leader that exits while something it started still holds the pipes open is also bounded by the
//! same deadline: the group is killed and the result is reported as timed out.

use std::io::{self, Read};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, trace, warn};

use super::RunOptions;
use crate::error::ProcessError;

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for the reader threads once the process group was killed.
///
/// A descendant that left the group (e.g. via `setsid`) can keep a pipe open past this; its reader
/// thread is then abandoned and exits only when that descendant closes the pipe.
const KILL_GRACE: Duration = Duration::from_secs(1);

/// Platform shell and the flag that makes it run a command string.
#[cfg(unix)]
const SHELL: (&str, &str) = ("sh", "-c");
#[cfg(windows)]
const SHELL: (&str, &str) = ("cmd", "/C");

/// What to run: an explicit argument vector, or a string for the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// `argv[0]` is the program, the rest are passed verbatim.
    Argv(Vec<String>),
    /// Passed to `sh -c` (or `cmd /C`).
    Shell(String),
}

impl CommandLine {
    /// The program that will actually be spawned.
    #[must_use]
    pub fn program(&self) -> &str {
        match self {
            Self::Argv(argv) => argv.first().map_or("", String::as_str),
            Self::Shell(_) => SHELL.0,
        }
    }
}

/// A single request to run one external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: CommandLine,
    pub options: RunOptions,
}

impl Invocation {
    /// Runs `args[0]` directly with the remaining arguments.
    pub fn argv<I, S>(args: I, options: RunOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: CommandLine::Argv(args.into_iter().map(Into::into).collect()),
            options,
        }
    }

    /// Runs `command` through the platform shell.
    pub fn shell(command: impl Into<String>, options: RunOptions) -> Self {
        Self {
            command: CommandLine::Shell(command.into()),
            options,
        }
    }
}

/// Outcome of a process that was spawned successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code; `-N` when killed by signal N, `-1` when unknown.
    pub exit_code: i32,
    /// Standard output from the process.
    pub stdout: String,
    /// Standard error from the process.
    pub stderr: String,
    /// The time budget ran out and the process was killed.
    pub timed_out: bool,
}

impl ProcessResult {
    /// Returns `true` if the process finished in time with exit code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Spawns and supervises external processes.
///
/// The dispatcher only talks to this trait, so tests can swap in a runner that records
/// invocations instead of spawning anything.
pub trait ProcessRunner: Send + Sync {
    /// Runs the invocation to completion or until its timeout expires.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `ProcessError::InvalidCommand` if the argument vector is empty
    /// - `ProcessError::WorkingDirectory` if the working directory is not an existing directory
    /// - `ProcessError::NotFound` if the program does not exist
    /// - `ProcessError::ExecutionFailed` if the process cannot be spawned or waited on
    /// - `ProcessError::OutputEncoding` if stdout/stderr of a finished process are not valid UTF-8
    fn run(&self, invocation: &Invocation) -> Result<ProcessResult, ProcessError>;
}

/// Runs processes on the host with `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    #[instrument(
        skip(self, invocation),
        fields(
            program = %invocation.command.program(),
            timeout_ms = %invocation.options.timeout.as_millis(),
        )
    )]
    fn run(&self, invocation: &Invocation) -> Result<ProcessResult, ProcessError> {
        let mut cmd = build_command(invocation)?;

        trace!("Spawning child process");
        let start = Instant::now();
        let deadline = start + invocation.options.timeout;
        let child = cmd
            .spawn()
            .map_err(|e| spawn_error(invocation.command.program(), e))?;
        let mut guard = ChildGuard::new(child);
        debug!(pid = guard.child.id(), "Child process running");

        let stdout_rx = drain(guard.child.stdout.take());
        let stderr_rx = drain(guard.child.stderr.take());

        let (status, mut timed_out) = loop {
            match guard.child.try_wait() {
                Ok(Some(status)) => {
                    guard.reaped = true;
                    break (status, false);
                }
                Ok(None) if Instant::now() >= deadline => {
                    warn!(elapsed_ms = %start.elapsed().as_millis(), "Process timed out, sending SIGKILL");
                    let status = guard.terminate().map_err(|e| {
                        ProcessError::ExecutionFailed(format!("failed to reap killed process: {e}"))
                    })?;
                    break (status, true);
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    return Err(ProcessError::ExecutionFailed(format!(
                        "failed to wait for process: {e}"
                    )));
                }
            }
        };

        let mut captured = Vec::with_capacity(2);
        for rx in [&stdout_rx, &stderr_rx] {
            let wait_until = if timed_out {
                Instant::now() + KILL_GRACE
            } else {
                deadline
            };
            match rx.recv_timeout(wait_until.saturating_duration_since(Instant::now())) {
                Ok(bytes) => captured.push(bytes),
                Err(RecvTimeoutError::Disconnected) => captured.push(Vec::new()),
                Err(RecvTimeoutError::Timeout) => {
                    if !timed_out {
                        warn!("Process exited but its output pipes stayed open past the deadline");
                        guard.kill_group();
                        timed_out = true;
                    }
                    captured.push(rx.recv_timeout(KILL_GRACE).unwrap_or_default());
                }
            }
        }
        let stderr_bytes = captured.pop().unwrap_or_default();
        let stdout_bytes = captured.pop().unwrap_or_default();

        let (stdout, stderr) = if timed_out {
            (
                String::from_utf8_lossy(&stdout_bytes).into_owned(),
                String::from_utf8_lossy(&stderr_bytes).into_owned(),
            )
        } else {
            (
                decode(stdout_bytes, "stdout")?,
                decode(stderr_bytes, "stderr")?,
            )
        };

        let exit_code = exit_code(status);
        debug!(exit_code, timed_out, elapsed_ms = %start.elapsed().as_millis(), "Process completed");
        Ok(ProcessResult {
            exit_code,
            stdout,
            stderr,
            timed_out,
        })
    }
}

/// Owns a spawned child and guarantees it is killed and reaped when dropped.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    /// Sends SIGKILL to the child's process group, then to the child itself.
    fn kill_group(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            if let Ok(pid) = i32::try_from(self.child.id()) {
                if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                    trace!(error = %e, "killpg failed, group already gone");
                }
            }
        }
        if !self.reaped {
            let _ = self.child.kill();
        }
    }

    /// Kills the process group and waits for the child to exit.
    fn terminate(&mut self) -> io::Result<ExitStatus> {
        self.kill_group();
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            trace!("Reaping abandoned child process");
            let _ = self.terminate();
        }
    }
}

fn build_command(invocation: &Invocation) -> Result<std::process::Command, ProcessError> {
    let mut cmd = match &invocation.command {
        CommandLine::Argv(argv) => {
            let (program, args) = argv.split_first().ok_or_else(|| {
                ProcessError::InvalidCommand("argument vector is empty".to_string())
            })?;
            if program.is_empty() {
                return Err(ProcessError::InvalidCommand(
                    "program name cannot be empty".to_string(),
                ));
            }
            let mut cmd = std::process::Command::new(program);
            cmd.args(args);
            cmd
        }
        CommandLine::Shell(line) => {
            let mut cmd = std::process::Command::new(SHELL.0);
            cmd.arg(SHELL.1).arg(line);
            cmd
        }
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = &invocation.options.working_dir {
        if !dir.is_dir() {
            return Err(ProcessError::WorkingDirectory { path: dir.clone() });
        }
        cmd.current_dir(dir);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    Ok(cmd)
}

fn spawn_error(program: &str, err: io::Error) -> ProcessError {
    if err.kind() == io::ErrorKind::NotFound {
        ProcessError::NotFound {
            program: program.to_string(),
            source: err,
        }
    } else {
        ProcessError::ExecutionFailed(format!("failed to spawn {program}: {err}"))
    }
}

/// Reads a pipe to the end on its own thread and hands the bytes back.
fn drain<R>(reader: Option<R>) -> Receiver<Vec<u8>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            let _ = r.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

fn decode(bytes: Vec<u8>, stream: &'static str) -> Result<String, ProcessError> {
    String::from_utf8(bytes).map_err(|_| ProcessError::OutputEncoding { stream })
}

fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}
