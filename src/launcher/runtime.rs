//! Container runtime availability probe
//!
//! Advisory only: callers use it to decide whether a containerized session
//! can run at all (and test suites use it to skip themselves).

use std::env;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_CONTAINER_RUNTIME;

/// Check if a file is an executable regular file
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Locate `command` on `PATH`; paths containing a separator are checked as-is
pub fn find_command(command: &str) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(command))
        .find(|path| is_executable(path))
}

/// Whether the named container runtime is installed
pub fn is_runtime_available(runtime: &str) -> bool {
    let found = find_command(runtime);
    match &found {
        Some(path) => debug!("Container runtime '{}' found at {}", runtime, path.display()),
        None => debug!("Container runtime '{}' not found on PATH", runtime),
    }
    found.is_some()
}

/// Whether the default runtime (`docker`) is installed
pub fn docker_available() -> bool {
    is_runtime_available(DEFAULT_CONTAINER_RUNTIME)
}
