//! Error types and Result aliases for the installer harness

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which child stream an I/O failure happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamKind::Stdin => "stdin",
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        };
        f.write_str(name)
    }
}

/// Main error type for the harness
#[derive(Debug)]
pub enum Error {
    // === Launch errors ===
    /// The installer (or the container runtime) could not be started
    LaunchFailed {
        command: String,
        reason: String,
    },

    /// A piped stream was not available on the spawned child
    StreamUnavailable {
        stream: StreamKind,
    },

    // === Session setup errors ===
    /// Failed to create the isolated working directory
    WorkingDirFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to copy the installer into the working directory
    InstallerCopyFailed {
        source: PathBuf,
        reason: String,
    },

    /// Failed to write the seed inventory
    InventoryWriteFailed {
        path: PathBuf,
        reason: String,
    },

    // === Run errors ===
    /// The inventory file could not be read back after a successful run
    InventoryReadFailed {
        path: PathBuf,
        reason: String,
    },

    /// I/O failure while driving or draining a child stream
    StreamFailed {
        stream: StreamKind,
        reason: String,
    },

    /// A concurrent session task panicked or was cancelled
    TaskFailed {
        task: String,
        reason: String,
    },

    /// The session did not finish within the configured limit
    SessionTimedOut {
        after: Duration,
    },

    // === Configuration errors ===
    /// Failed to load a session file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to parse a session file
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    /// Failed to write a session file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    /// No session file found in any search location
    ConfigNotFound,

    /// Session configuration is invalid
    Config(ConfigError),

    // === I/O errors ===
    /// I/O errors
    Io(std::io::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors
    Other(String),
}

impl Error {
    /// True for the errors raised before the installer ever ran
    pub fn is_launch_error(&self) -> bool {
        matches!(
            self,
            Error::LaunchFailed { .. } | Error::StreamUnavailable { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Launch errors
            Error::LaunchFailed { command, reason } => {
                write!(f, "Failed to launch '{}': {}", command, reason)
            }
            Error::StreamUnavailable { stream } => {
                write!(f, "Child {} was not piped", stream)
            }

            // Session setup errors
            Error::WorkingDirFailed { path, reason } => {
                write!(
                    f,
                    "Failed to create working directory in '{}': {}",
                    path.display(),
                    reason
                )
            }
            Error::InstallerCopyFailed { source, reason } => {
                write!(
                    f,
                    "Failed to copy installer '{}': {}",
                    source.display(),
                    reason
                )
            }
            Error::InventoryWriteFailed { path, reason } => {
                write!(
                    f,
                    "Failed to write inventory '{}': {}",
                    path.display(),
                    reason
                )
            }

            // Run errors
            Error::InventoryReadFailed { path, reason } => {
                write!(
                    f,
                    "Failed to read inventory '{}': {}",
                    path.display(),
                    reason
                )
            }
            Error::StreamFailed { stream, reason } => {
                write!(f, "I/O error on installer {}: {}", stream, reason)
            }
            Error::TaskFailed { task, reason } => {
                write!(f, "Session task '{}' failed: {}", task, reason)
            }
            Error::SessionTimedOut { after } => {
                write!(f, "Installer session timed out after {:?}", after)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(
                    f,
                    "Failed to load session file '{}': {}",
                    path.display(),
                    reason
                )
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} session file: {}", format, reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(
                    f,
                    "Failed to save session file '{}': {}",
                    path.display(),
                    reason
                )
            }
            Error::ConfigNotFound => {
                write!(f, "Session file not found")
            }
            Error::Config(err) => write!(f, "Invalid session configuration: {}", err),

            // I/O errors
            Error::Io(err) => write!(f, "I/O error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
