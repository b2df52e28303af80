//! External command execution.
//!
//! CMake and git are driven through the [`CommandExecutor`] trait so that the
//! pipeline can be exercised in tests without spawning real processes.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::process::{Command, Output, Stdio};

/// A fully described command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRequest {
    /// Program to run, looked up on `PATH`.
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
    /// Working directory; the current directory when `None`.
    pub working_dir: Option<Utf8PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
    /// Stream stdout/stderr to the terminal instead of capturing them.
    pub stream_output: bool,
}

impl CommandRequest {
    /// Start describing an invocation of `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command inside `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: &Utf8Path) -> Self {
        self.working_dir = Some(dir.to_owned());
        self
    }

    /// Set an environment variable for the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Choose whether output is streamed (verbose) or captured (quiet).
    #[must_use]
    pub fn streamed(mut self, stream_output: bool) -> Self {
        self.stream_output = stream_output;
        self
    }

    /// The command line as a single string, for diagnostics.
    #[must_use]
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs the command and returns its exit status and any captured output.
    ///
    /// Streamed commands return empty stdout and stderr buffers.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning or waiting for the
    /// command. A non-zero exit status is not an error at this level.
    fn run(&self, request: &CommandRequest) -> Result<Output>;
}

/// Executes commands on the host system.
///
/// # Examples
///
/// ```no_run
/// use plugin_deployer::process::{CommandExecutor, CommandRequest, SystemCommandExecutor};
///
/// let output = SystemCommandExecutor.run(&CommandRequest::new("cmake").args(["--version"]))?;
/// assert!(output.status.success());
/// # Ok::<(), plugin_deployer::error::DeployError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, request: &CommandRequest) -> Result<Output> {
        debug!("running: {}", request.display_line());

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        cmd.envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir.as_std_path());
        }

        if request.stream_output {
            let status = cmd
                .stdin(Stdio::null())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()?;
            return Ok(Output {
                status,
                stdout: Vec::new(),
                stderr: Vec::new(),
            });
        }

        Ok(cmd.stdin(Stdio::null()).output()?)
    }
}

/// Summarise why a command failed, preferring its stderr.
#[must_use]
pub fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_owned();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_owned();
    }
    format!("exited with {}", output.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{exit_status, failure_output};

    #[test]
    fn request_builder_collects_everything() {
        let request = CommandRequest::new("git")
            .args(["commit", "-m", "Version 1.0.0.0"])
            .current_dir(Utf8Path::new("/repo"))
            .env("GIT_AUTHOR_NAME", "Jane")
            .streamed(true);

        assert_eq!(request.program, "git");
        assert_eq!(request.args, vec!["commit", "-m", "Version 1.0.0.0"]);
        assert_eq!(request.working_dir, Some(Utf8PathBuf::from("/repo")));
        assert_eq!(
            request.env,
            vec![("GIT_AUTHOR_NAME".to_owned(), "Jane".to_owned())]
        );
        assert!(request.stream_output);
    }

    #[test]
    fn display_line_joins_program_and_args() {
        let request = CommandRequest::new("cmake").args(["--build", "build-x64"]);
        assert_eq!(request.display_line(), "cmake --build build-x64");
    }

    #[test]
    fn failure_reason_prefers_stderr() {
        let output = failure_output("fatal: not a git repository");
        assert_eq!(failure_reason(&output), "fatal: not a git repository");
    }

    #[test]
    fn failure_reason_falls_back_to_status() {
        let output = Output {
            status: exit_status(2),
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        assert!(failure_reason(&output).starts_with("exited with"));
    }
}
