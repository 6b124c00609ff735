//! Invocation of the `hg` executable
//!
//! All repository operations go through [`HgRunner`] so the orchestration
//! logic never touches `std::process` directly.

use std::process::Command;

use crate::{Error, Result};

/// Captured result of a single `hg` invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl CommandOutput {
    /// A successful invocation with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Trait for anything that can execute `hg` subcommands
pub trait HgRunner {
    /// Name or path of the executable, used in error messages
    fn program(&self) -> &str;

    /// Run `hg` with the given arguments and block until it exits
    ///
    /// A non-zero exit is not an error at this level; only a failure to
    /// start the process is.
    fn run(&self, args: &[String]) -> Result<CommandOutput>;

    /// Run `hg` and turn a non-zero exit into [`Error::Command`]
    fn run_checked(&self, args: &[String]) -> Result<CommandOutput> {
        let output = self.run(args)?;
        if !output.success {
            return Err(Error::Command {
                command: format!("{} {}", self.program(), args.join(" ")),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Runs the real `hg` binary as a child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    executable: String,
}

impl ProcessRunner {
    /// Create a runner using `hg` from `PATH`
    pub fn new() -> Self {
        Self {
            executable: "hg".to_string(),
        }
    }

    /// Use a custom executable path
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl HgRunner for ProcessRunner {
    fn program(&self) -> &str {
        &self.executable
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!(program = %self.executable, args = ?args, "Running hg");

        // HGPLAIN disables user aliases and localization so output stays parseable
        let output = Command::new(&self.executable)
            .args(args)
            .env("HGPLAIN", "1")
            .output()
            .map_err(|e| Error::Spawn {
                program: self.executable.clone(),
                source: e,
            })?;

        let result = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success {
            tracing::debug!(
                program = %self.executable,
                status = ?output.status.code(),
                stderr = %result.stderr.trim(),
                "hg exited with failure"
            );
        }

        Ok(result)
    }
}
