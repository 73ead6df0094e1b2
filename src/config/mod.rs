//! Session configuration
//!
//! Everything a caller supplies for one installer run: the installer to
//! copy, its arguments and environment, the answer table, the seed
//! inventory, and optionally a container to run it in.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::interaction::{AnswerTable, DEFAULT_FALLBACK_ANSWER};
use crate::inventory::{Inventory, DEFAULT_INVENTORY_FILE};

/// Container runtime used when none is configured
pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";

/// Where the working directory is mounted inside the container
pub const DEFAULT_MOUNT_POINT: &str = "/data";

/// Prefix of generated container names
pub const CONTAINER_NAME_PREFIX: &str = "installer-harness";

/// Configuration for one installation session
///
/// Table-valued fields stay last; TOML output needs plain values first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Installer executable copied into the working directory
    pub installer: PathBuf,

    /// Argument string, split with POSIX shell quoting rules
    #[serde(default)]
    pub args: String,

    /// Inventory file name inside the working directory
    #[serde(default = "default_inventory_file")]
    pub inventory_file: String,

    /// Answer used for prompts missing from the table
    #[serde(default = "default_fallback_answer")]
    pub fallback_answer: String,

    /// Overall session limit in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Parent directory for the working directory (system temp dir if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_root: Option<PathBuf>,

    /// Environment passed to the installer
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Prompt label to answer mapping
    #[serde(default)]
    pub answers: AnswerTable,

    /// Seed inventory written before the run
    #[serde(default)]
    pub inventory: Inventory,

    /// Run inside a container instead of natively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerConfig>,
}

fn default_inventory_file() -> String {
    DEFAULT_INVENTORY_FILE.to_string()
}

fn default_fallback_answer() -> String {
    DEFAULT_FALLBACK_ANSWER.to_string()
}

impl SessionConfig {
    /// Native session for `installer` with everything else defaulted
    pub fn new(installer: impl Into<PathBuf>) -> Self {
        Self {
            installer: installer.into(),
            args: String::new(),
            env: BTreeMap::new(),
            answers: AnswerTable::new(),
            inventory: Inventory::new(),
            inventory_file: default_inventory_file(),
            fallback_answer: default_fallback_answer(),
            container: None,
            timeout_secs: None,
            temp_root: None,
        }
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.env.insert(key.into(), value.to_string());
        self
    }

    pub fn with_answers(mut self, answers: AnswerTable) -> Self {
        self.answers = answers;
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_inventory_file(mut self, name: impl Into<String>) -> Self {
        self.inventory_file = name.into();
        self
    }

    pub fn with_fallback_answer(mut self, answer: impl Into<String>) -> Self {
        self.fallback_answer = answer.into();
        self
    }

    pub fn with_container(mut self, container: ContainerConfig) -> Self {
        self.container = Some(container);
        self
    }

    /// Limit the whole session. The limit is kept in whole seconds, so any
    /// fractional part rounds up.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = Some(secs.max(1));
        self
    }

    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Installer file name, as invoked inside the working directory
    pub fn installer_command(&self) -> Result<&str, ConfigError> {
        self.installer
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ConfigError::InstallerHasNoFileName(self.installer.clone()))
    }

    /// Installer arguments as argv entries
    ///
    /// Quotes group words (`--name 'a b'` is two entries) but nothing is
    /// expanded; no shell is involved.
    pub fn argv(&self) -> Result<Vec<String>, ConfigError> {
        shlex::split(&self.args).ok_or_else(|| ConfigError::UnparsableArgs(self.args.clone()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn is_containerized(&self) -> bool {
        self.container.is_some()
    }

    /// Parent directory for the session's working directory
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Check the configuration before anything touches the filesystem
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.installer.as_os_str().is_empty() {
            return Err(ConfigError::MissingInstaller);
        }
        self.installer_command()?;

        if self.inventory_file.is_empty()
            || self.inventory_file.contains('/')
            || self.inventory_file.contains('\\')
        {
            return Err(ConfigError::InvalidInventoryFile(
                self.inventory_file.clone(),
            ));
        }

        self.argv()?;

        if let Some(key) = self
            .env
            .keys()
            .find(|key| key.is_empty() || key.contains('='))
        {
            return Err(ConfigError::InvalidEnvKey(key.clone()));
        }

        if let Some((key, reason)) = self.inventory.find_unrepresentable() {
            return Err(ConfigError::InvalidInventoryEntry {
                key: key.to_string(),
                reason: reason.to_string(),
            });
        }

        if self.fallback_answer.contains('\n') {
            return Err(ConfigError::MultilineAnswer("<fallback>".to_string()));
        }
        if let Some(label) = self
            .answers
            .labels()
            .find(|label| self.answers.lookup(label).is_some_and(|a| a.contains('\n')))
        {
            return Err(ConfigError::MultilineAnswer(label.to_string()));
        }

        if let Some(container) = &self.container {
            container.validate()?;
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Resolve relative paths against `base`, the session file's directory
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.installer.is_relative() {
            self.installer = base.join(&self.installer);
        }
        if let Some(root) = self.temp_root.as_mut() {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }
}

/// Containerized execution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Image the installer runs in
    pub image: String,

    /// Container name; two live sessions must not share one
    pub name: String,

    /// Runtime binary
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// In-container mount point and working directory
    #[serde(default = "default_mount_point")]
    pub mount_point: String,
}

fn default_runtime() -> String {
    DEFAULT_CONTAINER_RUNTIME.to_string()
}

fn default_mount_point() -> String {
    DEFAULT_MOUNT_POINT.to_string()
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            runtime: default_runtime(),
            mount_point: default_mount_point(),
        }
    }

    /// Container with a freshly generated name, safe for concurrent sessions
    pub fn with_unique_name(image: impl Into<String>) -> Self {
        let name = format!("{}-{}", CONTAINER_NAME_PREFIX, uuid::Uuid::new_v4());
        Self::new(image, name)
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.trim().is_empty() {
            return Err(ConfigError::EmptyContainerImage);
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyContainerName);
        }
        if self.runtime.trim().is_empty() {
            return Err(ConfigError::EmptyContainerRuntime);
        }
        if !self.mount_point.starts_with('/') {
            return Err(ConfigError::InvalidMountPoint(self.mount_point.clone()));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No installer configured")]
    MissingInstaller,

    #[error("Installer path has no file name: {0}")]
    InstallerHasNoFileName(PathBuf),

    #[error("Invalid inventory file name: '{0}' (must be a plain file name)")]
    InvalidInventoryFile(String),

    #[error("Cannot split installer arguments (unbalanced quotes?): {0}")]
    UnparsableArgs(String),

    #[error("Invalid environment variable name: '{0}'")]
    InvalidEnvKey(String),

    #[error("Inventory entry '{key}' cannot be written: {reason}")]
    InvalidInventoryEntry { key: String, reason: String },

    #[error("Answer for prompt '{0}' contains a line break")]
    MultilineAnswer(String),

    #[error("Container image is empty")]
    EmptyContainerImage,

    #[error("Container name is empty")]
    EmptyContainerName,

    #[error("Container runtime is empty")]
    EmptyContainerRuntime,

    #[error("Invalid container mount point: '{0}' (must be absolute)")]
    InvalidMountPoint(String),

    #[error("Session timeout must be at least one second")]
    ZeroTimeout,
}
