//! Installer Harness - drive interactive command-line installers unattended
//!
//! This library launches an interactive installer (natively or inside a
//! container), answers its text prompts from a pre-supplied answer table,
//! captures everything it prints, and exchanges state with it through a
//! flat `key=value` inventory file.
//!
//! ## Module Organization
//!
//! - [`session`] - One full run: working directory, launch, interaction, result
//! - [`interaction`] - Prompt grammar, answer table, and the interaction engine
//! - [`launcher`] - Native and containerized command lines, spawning, runtime probe
//! - [`inventory`] - The `key=value` inventory codec
//! - [`config`] - Session configuration and session-file loading
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use installer_harness::{AnswerTable, Inventory, InstallationSession, SessionConfig};
//!
//! # async fn example() -> installer_harness::Result<()> {
//! let config = SessionConfig::new("installer/install.sh")
//!     .with_args("-L en")
//!     .with_env("SKIP_CHECKS", "1")
//!     .with_answers(AnswerTable::new().with("Admin login", "admin"))
//!     .with_inventory([("license_ip", "10.0.0.1")].into_iter().collect::<Inventory>());
//!
//! let result = InstallationSession::new(config).run().await?;
//! if let Some(inventory) = result.inventory() {
//!     println!("installed: {:?}", inventory.get("installed"));
//! } else {
//!     eprintln!("installer failed:\n{}", result.stderr);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Prompt Protocol
//!
//! An installer awaiting input prints `"<label> > "` and blocks without a
//! line break. The engine reads stdout one character at a time, so it
//! never waits for a line that will not come. Unknown prompts get a
//! fallback answer and a warning instead of failing the run.
//!
//! ## Concurrency
//!
//! Per session: one child process plus two tasks, the interaction engine
//! (stdout in, stdin out) and a stderr drain. The exit status is awaited
//! only after both tasks finish.

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod interaction;
pub mod inventory;
pub mod launcher;
pub mod session;

// Re-exports for core functionality
pub use config::loader::ConfigLoader;
pub use config::{ContainerConfig, SessionConfig};
pub use error::{Error, Result};
pub use interaction::{AnswerTable, InteractionEngine, PromptExchange, Resolution, Transcript};
pub use inventory::Inventory;
pub use launcher::{docker_available, is_runtime_available};
pub use session::{run_session, InstallationSession, InventoryOutcome, SessionResult};

// Version information
/// The current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");
