//! Shared test utilities for the deployer crate.

use crate::error::{DeployError, Result};
use crate::process::{CommandExecutor, CommandRequest};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    stdout_output("")
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute (e.g., "git").
    pub program: &'static str,
    /// The arguments to pass to the program.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// An expected call that succeeds with the given stdout.
    #[must_use]
    pub fn ok(program: &'static str, args: &[&str], stdout: &str) -> Self {
        Self {
            program,
            args: args.iter().map(|&a| a.to_owned()).collect(),
            result: Ok(stdout_output(stdout)),
        }
    }

    /// An expected call that exits with status 1 and the given stderr.
    #[must_use]
    pub fn failing(program: &'static str, args: &[&str], stderr: &str) -> Self {
        Self {
            program,
            args: args.iter().map(|&a| a.to_owned()).collect(),
            result: Ok(failure_output(stderr)),
        }
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Replays expected command invocations in order and records every request
/// it receives, so tests can also inspect working directories and
/// environment variables.
#[derive(Debug, Default)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    received: RefCell<Vec<CommandRequest>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            received: RefCell::new(Vec::new()),
        }
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn received(&self) -> Vec<CommandRequest> {
        self.received.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        let remaining = self.expected.borrow();
        assert!(
            remaining.is_empty(),
            "expected no further command invocations, {} left: {:?}",
            remaining.len(),
            remaining.iter().map(|c| c.program).collect::<Vec<_>>()
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, request: &CommandRequest) -> Result<Output> {
        self.received.borrow_mut().push(request.clone());

        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(DeployError::StubMismatch {
                message: format!("unexpected invocation: {}", request.display_line()),
            });
        };

        if call.program != request.program || call.args != request.args {
            return Err(DeployError::StubMismatch {
                message: format!(
                    "expected `{} {}`, got `{}`",
                    call.program,
                    call.args.join(" "),
                    request.display_line()
                ),
            });
        }

        call.result
    }
}
