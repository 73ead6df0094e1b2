//! Installer Process Spawning
//!
//! Starts a launch plan with all three standard streams piped and hands the
//! streams out separately from the handle used to await termination.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use super::plan::LaunchPlan;
use crate::error::{Error, Result, StreamKind};

/// Piped standard streams of a spawned installer
pub struct ProcessStreams {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// Handle to a running installer
#[derive(Debug)]
pub struct LaunchedProcess {
    child: Child,
    command_line: String,
}

/// `ETXTBSY`: the freshly copied installer is still open for writing in a
/// child forked by another thread.
const TEXT_FILE_BUSY: i32 = 26;
const MAX_SPAWN_ATTEMPTS: u32 = 5;

/// Spawn the planned command
///
/// The child is killed if the handle is dropped before it exits.
pub async fn spawn(plan: &LaunchPlan) -> Result<(LaunchedProcess, ProcessStreams)> {
    let command_line = plan.command_line();

    let mut command = Command::new(&plan.program);
    command
        .args(&plan.args)
        .envs(&plan.env)
        .current_dir(&plan.cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut attempts = 0;
    let mut child = loop {
        attempts += 1;
        match command.spawn() {
            Ok(child) => break child,
            Err(e) if is_text_file_busy(&e) && attempts < MAX_SPAWN_ATTEMPTS => {
                debug!(
                    "Installer busy, retrying spawn ({}/{})",
                    attempts, MAX_SPAWN_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_millis(20 * u64::from(attempts))).await;
            }
            Err(e) => {
                return Err(Error::LaunchFailed {
                    command: command_line,
                    reason: e.to_string(),
                })
            }
        }
    };

    let streams = ProcessStreams {
        stdin: child.stdin.take().ok_or(Error::StreamUnavailable {
            stream: StreamKind::Stdin,
        })?,
        stdout: child.stdout.take().ok_or(Error::StreamUnavailable {
            stream: StreamKind::Stdout,
        })?,
        stderr: child.stderr.take().ok_or(Error::StreamUnavailable {
            stream: StreamKind::Stderr,
        })?,
    };

    info!(
        "Launched installer ({} mode, pid {:?}): {}",
        plan.mode,
        child.id(),
        command_line
    );

    Ok((
        LaunchedProcess {
            child,
            command_line,
        },
        streams,
    ))
}

fn is_text_file_busy(err: &io::Error) -> bool {
    cfg!(target_os = "linux") && err.raw_os_error() == Some(TEXT_FILE_BUSY)
}

impl LaunchedProcess {
    /// OS process id, `None` once the child has been reaped
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Wait for the installer to exit
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        let status = self.child.wait().await?;
        info!("Installer exited with {}", status);
        Ok(status)
    }

    /// Forcefully stop the installer; its streams close as a result
    pub async fn kill(&mut self) -> Result<()> {
        warn!("Killing installer: {}", self.command_line);
        self.child.kill().await?;
        Ok(())
    }
}
