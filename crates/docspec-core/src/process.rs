// crates/docspec-core/src/process.rs
// ============================================================================
// Module: Subprocess Harness
// Description: Entrypoint tokenizing and captured, time-bounded child execution.
// Purpose: Run `cli.run` commands with an explicit environment and full capture.
// Dependencies: thiserror, wait-timeout
// ============================================================================

//! ## Overview
//! [`tokenize_entrypoint`] splits a command string with shell-style quoting
//! (no expansion of any kind). [`run_captured`] spawns the program with a
//! cleared environment replaced by the caller's map, closes stdin
//! immediately, drains stdout and stderr on reader threads, and waits at most
//! the configured timeout before killing and reaping the child. The same
//! deadline bounds collection of the output, so a grandchild that keeps a
//! pipe open cannot stall the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io;
use std::io::Read;
use std::process::Command;
use std::process::Stdio;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;
use wait_timeout::ChildExt;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Exit code reported when the child was terminated by a signal.
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// Fully specified child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Program to execute.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
    /// Complete child environment.
    pub env: BTreeMap<String, String>,
    /// Maximum time to wait for exit.
    pub timeout: Duration,
}

/// Captured result of a finished child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, or [`SIGNALED_EXIT_CODE`] for signal termination.
    pub exit_code: i32,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

/// Failures while tokenizing or running a child.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The entrypoint string could not be tokenized.
    #[error("harness.entrypoint {0}")]
    Tokenize(String),
    /// The program could not be started.
    #[error("failed to launch cli.run entrypoint {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error text.
        message: String,
    },
    /// Waiting on or reading from the child failed.
    #[error("cli.run entrypoint i/o error: {0}")]
    Io(String),
    /// The child exceeded the timeout and was killed.
    #[error("cli.run entrypoint timed out after {0} ms")]
    TimedOut(u128),
}

// ============================================================================
// SECTION: Tokenizing
// ============================================================================

/// Splits an entrypoint string into program and arguments.
///
/// Whitespace separates tokens outside quotes. Single quotes are literal,
/// double quotes allow `\"` and `\\`, and a backslash outside quotes escapes
/// the next character. Empty tokens are dropped.
///
/// # Errors
///
/// Returns [`ProcessError::Tokenize`] for unterminated quotes or a trailing
/// backslash.
pub fn tokenize_entrypoint(raw: &str) -> Result<Vec<String>, ProcessError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => loop {
                match chars.next() {
                    Some('\'') => break,
                    Some(inner) => current.push(inner),
                    None => return Err(ProcessError::Tokenize("has an unterminated quote".into())),
                }
            },
            '"' => loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped @ ('"' | '\\')) => current.push(escaped),
                        Some(other) => {
                            current.push('\\');
                            current.push(other);
                        }
                        None => {
                            return Err(ProcessError::Tokenize(
                                "has an unterminated quote".into(),
                            ));
                        }
                    },
                    Some(inner) => current.push(inner),
                    None => return Err(ProcessError::Tokenize("has an unterminated quote".into())),
                }
            },
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => return Err(ProcessError::Tokenize("ends with a bare backslash".into())),
            },
            separator if separator.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs a child to completion and captures its output.
///
/// # Errors
///
/// Returns [`ProcessError`] when the child cannot be spawned, waited on, or
/// exceeds its timeout.
pub fn run_captured(spec: &ProcessSpec) -> Result<CapturedOutput, ProcessError> {
    let deadline = Instant::now().checked_add(spec.timeout);
    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .env_clear()
        .envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| ProcessError::Spawn {
            program: spec.program.clone(),
            message: err.to_string(),
        })?;
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());
    let waited = child.wait_timeout(spec.timeout).map_err(|err| ProcessError::Io(err.to_string()));
    let status = match waited {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProcessError::TimedOut(spec.timeout.as_millis()));
        }
        Err(err) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(err);
        }
    };
    Ok(CapturedOutput {
        exit_code: status.code().unwrap_or(SIGNALED_EXIT_CODE),
        stdout: collect_reader(stdout, deadline, spec.timeout)?,
        stderr: collect_reader(stderr, deadline, spec.timeout)?,
    })
}

/// Drains a child pipe on a background thread.
fn spawn_reader<R>(pipe: Option<R>) -> Option<Receiver<io::Result<Vec<u8>>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let result = pipe.read_to_end(&mut buffer).map(|_| buffer);
            let _ = sender.send(result);
        });
        receiver
    })
}

/// Waits for a reader's bytes until `deadline` and decodes them.
///
/// A reader still blocked at the deadline is abandoned; its thread exits
/// once the last holder of the pipe closes it.
fn collect_reader(
    receiver: Option<Receiver<io::Result<Vec<u8>>>>,
    deadline: Option<Instant>,
    timeout: Duration,
) -> Result<String, ProcessError> {
    let Some(receiver) = receiver else {
        return Ok(String::new());
    };
    let received = match deadline {
        Some(deadline) => receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    let bytes = match received {
        Ok(result) => result.map_err(|err| ProcessError::Io(err.to_string()))?,
        Err(RecvTimeoutError::Timeout) => return Err(ProcessError::TimedOut(timeout.as_millis())),
        Err(RecvTimeoutError::Disconnected) => {
            return Err(ProcessError::Io("output reader thread panicked".to_string()));
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
