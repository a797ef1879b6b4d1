//! System command probes.
//!
//! A probe runs one command and captures its output. Failures are data,
//! not errors: a missing `journalctl` should not stop the rest of the
//! collection.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::process::Command;

/// A command to capture, and the file name its output is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCommand {
    pub file_name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl ProbeCommand {
    pub fn new(file_name: &str, program: &str, args: &[&str]) -> Self {
        Self {
            file_name: file_name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a probe finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Ran to completion with this exit code (`None` if killed by a signal).
    Exited(Option<i32>),
    /// Could not be started.
    Failed(String),
    TimedOut(Duration),
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Exited(Some(code)) => write!(f, "exit {}", code),
            ProbeStatus::Exited(None) => f.write_str("terminated by signal"),
            ProbeStatus::Failed(reason) => write!(f, "failed to start: {}", reason),
            ProbeStatus::TimedOut(after) => write!(f, "timed out after {}s", after.as_secs()),
        }
    }
}

/// Captured result of a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    pub status: ProbeStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProbeOutput {
    pub fn failed(status: ProbeStatus) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == ProbeStatus::Exited(Some(0))
    }

    /// Text stored in the bundle for this probe.
    pub fn render(&self, command: &ProbeCommand) -> String {
        format!(
            "$ {}\n# {}\n\n--- stdout ---\n{}\n--- stderr ---\n{}\n",
            command.command_line(),
            self.status,
            self.stdout,
            self.stderr
        )
    }
}

/// Runs probe commands.
#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn run(&self, command: &ProbeCommand) -> ProbeOutput;
}

/// Runs commands on the local machine with a per-command timeout.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SystemProbe for CommandProbe {
    async fn run(&self, command: &ProbeCommand) -> ProbeOutput {
        tracing::debug!(command = %command.command_line(), "running probe");

        let child = Command::new(&command.program)
            .args(&command.args)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => ProbeOutput {
                status: ProbeStatus::Exited(output.status.code()),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Ok(Err(e)) => {
                tracing::warn!(program = %command.program, error = %e, "probe could not start");
                ProbeOutput::failed(ProbeStatus::Failed(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(program = %command.program, "probe timed out");
                ProbeOutput::failed(ProbeStatus::TimedOut(self.timeout))
            }
        }
    }
}

/// Standard probes for a node running as the systemd unit `service`.
pub fn default_commands(service: &str, journal_lines: u32) -> Vec<ProbeCommand> {
    let lines = journal_lines.to_string();
    vec![
        ProbeCommand::new("systemctl-status.txt", "systemctl", &["status", service, "--no-pager"]),
        ProbeCommand::new(
            "journal.txt",
            "journalctl",
            &["-u", service, "-n", lines.as_str(), "--no-pager"],
        ),
        ProbeCommand::new("processes.txt", "ps", &["aux"]),
        ProbeCommand::new("interfaces.txt", "ip", &["addr"]),
        ProbeCommand::new("sockets.txt", "ss", &["-tulpn"]),
        ProbeCommand::new("disk.txt", "df", &["-h"]),
    ]
}
