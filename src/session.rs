//! Installation Session
//!
//! One full installer run: an exclusive working directory, the seed
//! inventory, the launch, the interaction engine and stderr drain running
//! side by side, the exit status, and the result inventory.
//!
//! The exit status is only awaited after both tasks have seen their
//! streams close. Waiting earlier can deadlock an installer blocked on a
//! full stdout pipe.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinError;

use crate::config::SessionConfig;
use crate::error::{Error, Result, StreamKind};
use crate::interaction::{InteractionEngine, PromptExchange, Transcript};
use crate::inventory::Inventory;
use crate::launcher::{self, LaunchPlan, LaunchedProcess, ProcessStreams};

/// Prefix of session working directories
pub const WORKING_DIR_PREFIX: &str = "installer-harness-";

/// What became of the result inventory
#[derive(Debug)]
pub enum InventoryOutcome {
    /// The run succeeded and the inventory was read back
    Collected(Inventory),
    /// The run failed, so the inventory was not read
    Skipped,
    /// The run succeeded but the inventory file could not be read
    Unreadable(Error),
}

/// Outcome of one installer run
#[derive(Debug)]
pub struct SessionResult {
    /// Everything the installer wrote to stdout
    pub stdout: String,
    /// Everything the installer wrote to stderr
    pub stderr: String,
    pub status: ExitStatus,
    /// Prompts answered during the run, in order
    pub exchanges: Vec<PromptExchange>,
    pub inventory: InventoryOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, `None` if the installer was killed by a signal
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    /// The result inventory, present only after a successful run
    pub fn inventory(&self) -> Option<&Inventory> {
        match &self.inventory {
            InventoryOutcome::Collected(inventory) => Some(inventory),
            _ => None,
        }
    }

    /// Why the inventory of a successful run could not be read
    pub fn inventory_error(&self) -> Option<&Error> {
        match &self.inventory {
            InventoryOutcome::Unreadable(err) => Some(err),
            _ => None,
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs one installer from working-directory setup to result collection
#[derive(Debug, Clone)]
pub struct InstallationSession {
    config: SessionConfig,
}

impl InstallationSession {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the installer to completion
    ///
    /// A nonzero exit is not an error: it is reported through the status
    /// and suppresses the inventory read. The working directory is removed
    /// on every path out of this function.
    pub async fn run(&self) -> Result<SessionResult> {
        self.config.validate()?;

        let started_at = Utc::now();
        let working_dir = self.create_working_dir()?;
        info!("Session working directory: {}", working_dir.path().display());

        let result = self.run_in(working_dir.path(), started_at).await;

        let path = working_dir.path().to_path_buf();
        if let Err(e) = working_dir.close() {
            warn!(
                "Failed to remove working directory {}: {}",
                path.display(),
                e
            );
        }

        result
    }

    fn create_working_dir(&self) -> Result<TempDir> {
        let root = self.config.temp_root();
        tempfile::Builder::new()
            .prefix(WORKING_DIR_PREFIX)
            .tempdir_in(&root)
            .map_err(|e| Error::WorkingDirFailed {
                path: root,
                reason: e.to_string(),
            })
    }

    async fn run_in(&self, dir: &Path, started_at: DateTime<Utc>) -> Result<SessionResult> {
        let inventory_path = dir.join(&self.config.inventory_file);
        self.config.inventory.write_to_file(&inventory_path)?;
        self.copy_installer(dir).await?;

        let plan = LaunchPlan::for_session(&self.config, dir)?;
        let (mut process, streams) = launcher::spawn(&plan).await?;

        let (transcript, stderr) = self.interact(&mut process, streams).await?;
        let status = process.wait().await?;

        let inventory = if status.success() {
            match Inventory::read_from_file(&inventory_path) {
                Ok(inventory) => InventoryOutcome::Collected(inventory),
                Err(e) => {
                    warn!("Installer succeeded but {}", e);
                    InventoryOutcome::Unreadable(e)
                }
            }
        } else {
            info!("Installer failed, skipping inventory read");
            InventoryOutcome::Skipped
        };

        let unresolved = transcript.unresolved().count();
        if unresolved > 0 {
            warn!("{} prompt(s) were answered with the fallback value", unresolved);
        }
        let undelivered = transcript.undelivered().count();
        if undelivered > 0 {
            warn!("{} answer(s) could not be delivered to the installer", undelivered);
        }

        Ok(SessionResult {
            stdout: transcript.output,
            stderr,
            status,
            exchanges: transcript.exchanges,
            inventory,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Copy the installer into `dir` and make it executable
    async fn copy_installer(&self, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(self.config.installer_command()?);
        let copy_failed = |e: std::io::Error| Error::InstallerCopyFailed {
            source: self.config.installer.clone(),
            reason: e.to_string(),
        };

        tokio::fs::copy(&self.config.installer, &target)
            .await
            .map_err(copy_failed)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(copy_failed)?;
        }

        debug!("Copied installer to {}", target.display());
        Ok(target)
    }

    /// Drive stdout/stdin and drain stderr concurrently until both close
    async fn interact(
        &self,
        process: &mut LaunchedProcess,
        streams: ProcessStreams,
    ) -> Result<(Transcript, String)> {
        let ProcessStreams {
            stdin,
            stdout,
            stderr,
        } = streams;

        let engine = InteractionEngine::new(self.config.answers.clone())
            .with_fallback_answer(self.config.fallback_answer.clone());

        let driver = tokio::spawn(async move { engine.drive(stdout, stdin).await });
        let drain = tokio::spawn(drain_stream(stderr));

        let rendezvous = async {
            tokio::try_join!(
                async { flatten_join("interaction engine", driver.await) },
                async { flatten_join("stderr drain", drain.await) }
            )
        };

        match self.config.timeout() {
            None => rendezvous.await,
            Some(limit) => match tokio::time::timeout(limit, rendezvous).await {
                Ok(joined) => joined,
                Err(_) => {
                    error!("Installer did not finish within {:?}", limit);
                    process.kill().await?;
                    Err(Error::SessionTimedOut { after: limit })
                }
            },
        }
    }
}

/// Read a stream to its end, decoding lossily
async fn drain_stream<R: AsyncRead + Unpin>(mut stream: R) -> Result<String> {
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| Error::StreamFailed {
            stream: StreamKind::Stderr,
            reason: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn flatten_join<T>(task: &str, joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    joined.unwrap_or_else(|e| {
        Err(Error::TaskFailed {
            task: task.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Convenience wrapper: build a session for `config` and run it
pub async fn run_session(config: SessionConfig) -> Result<SessionResult> {
    InstallationSession::new(config).run().await
}
