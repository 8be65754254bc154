//! Subprocess execution for the external CLI tools

use crate::{Error, Result};
use std::process::{Command, Output, Stdio};

/// Output from a command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr, the way a terminal would have shown them
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
            (false, true) => self.stdout.clone(),
            (true, _) => self.stderr.clone(),
        }
    }
}

/// Seam between the adapters and the operating system.
///
/// Every invocation blocks until the child exits; no timeout is applied.
pub trait CommandRunner {
    /// Run a command and capture its output
    fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run a command with stdout/stderr passed through to the terminal.
    /// Returns whether it exited successfully.
    fn run_passthrough(&self, cmd: &str, args: &[&str]) -> Result<bool>;

    /// Whether an executable is reachable on `PATH`
    fn is_available(&self, cmd: &str) -> bool;
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn spawn_error(cmd: &str, args: &[&str], e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::CommandNotFound(cmd.to_string())
        } else {
            Error::Command {
                cmd: format!("{} {}", cmd, args.join(" ")),
                message: e.to_string(),
            }
        }
    }

    fn parse_output(output: Output) -> CommandOutput {
        CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput> {
        log::debug!("running: {} {}", cmd, args.join(" "));
        let output = Command::new(cmd)
            .args(args)
            .output()
            .map_err(|e| Self::spawn_error(cmd, args, e))?;
        Ok(Self::parse_output(output))
    }

    fn run_passthrough(&self, cmd: &str, args: &[&str]) -> Result<bool> {
        log::debug!("running (passthrough): {} {}", cmd, args.join(" "));
        let status = Command::new(cmd)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Self::spawn_error(cmd, args, e))?;
        Ok(status.success())
    }

    fn is_available(&self, cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}
