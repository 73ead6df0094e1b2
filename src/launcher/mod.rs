//! Installer process launching
//!
//! Turns a session configuration into a command line (native or
//! containerized), spawns it with piped standard streams, and probes for
//! the container runtime.

pub mod plan;
pub mod process;
pub mod runtime;

// Re-exports for convenience
pub use plan::{LaunchMode, LaunchPlan};
pub use process::{spawn, LaunchedProcess, ProcessStreams};
pub use runtime::{docker_available, find_command, is_executable, is_runtime_available};
