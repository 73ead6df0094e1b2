//! Launch Plans
//!
//! Builds the exact program, argv, environment and working directory for
//! an installer run, natively or inside a container.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ContainerConfig, SessionConfig};
use crate::error::Result;

/// How the installer is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// `<workdir>/<installer> <args>` with an extended environment
    Native,
    /// `<runtime> run ... <image> ./<installer> <args>`
    Container,
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Native => f.write_str("native"),
            LaunchMode::Container => f.write_str("container"),
        }
    }
}

/// Fully resolved command for one installer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub mode: LaunchMode,
    /// Program to execute
    pub program: PathBuf,
    /// Program arguments
    pub args: Vec<String>,
    /// Variables added to the inherited environment
    pub env: BTreeMap<String, String>,
    /// Working directory of the spawned process
    pub cwd: PathBuf,
}

impl LaunchPlan {
    /// Plan for `config`, with the installer already copied into `working_dir`
    pub fn for_session(config: &SessionConfig, working_dir: &Path) -> Result<Self> {
        let installer = config.installer_command()?;
        let argv = config.argv()?;

        let plan = match &config.container {
            Some(container) => {
                Self::container(container, installer, &argv, &config.env, working_dir)
            }
            None => Self::native(installer, &argv, &config.env, working_dir),
        };
        Ok(plan)
    }

    pub fn native(
        installer: &str,
        argv: &[String],
        env: &BTreeMap<String, String>,
        working_dir: &Path,
    ) -> Self {
        Self {
            mode: LaunchMode::Native,
            program: working_dir.join(installer),
            args: argv.to_vec(),
            env: env.clone(),
            cwd: working_dir.to_path_buf(),
        }
    }

    /// Environment travels as `-e KEY=VALUE` flags; the runtime itself
    /// gets no extra variables.
    pub fn container(
        container: &ContainerConfig,
        installer: &str,
        argv: &[String],
        env: &BTreeMap<String, String>,
        working_dir: &Path,
    ) -> Self {
        let mut args = vec!["run".to_string()];
        for (key, value) in env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.extend([
            "--name".to_string(),
            container.name.clone(),
            "-i".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:{}", working_dir.display(), container.mount_point),
            "-w".to_string(),
            container.mount_point.clone(),
            container.image.clone(),
            format!("./{}", installer),
        ]);
        args.extend(argv.iter().cloned());

        Self {
            mode: LaunchMode::Container,
            program: PathBuf::from(&container.runtime),
            args,
            env: BTreeMap::new(),
            cwd: working_dir.to_path_buf(),
        }
    }

    /// Human-readable command line for logs and errors
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
