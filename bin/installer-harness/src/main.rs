//! installer-harness - run an interactive installer from a session file
//!
//! Loads a session file, drives the installer to completion, prints a JSON
//! report on stdout and exits with the installer's exit code. Logs go to
//! stderr.

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, error, info};

use installer_harness::config::DEFAULT_CONTAINER_RUNTIME;
use installer_harness::{
    is_runtime_available, ConfigLoader, InstallationSession, Inventory, PromptExchange,
    SessionResult,
};

/// What the command line asked for
#[derive(Debug, PartialEq)]
enum Command {
    /// Run a session
    Run(RunArgs),
    /// Report whether a container runtime is installed
    CheckRuntime { runtime: String, debug: bool },
    Help,
    Version,
}

#[derive(Debug, Default, PartialEq)]
struct RunArgs {
    /// Session file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
}

impl Command {
    /// Parse command line arguments (without the program name)
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut run_args = RunArgs::default();
        let mut check_runtime = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    let path = args.get(i + 1).context("Missing session file path")?;
                    run_args.config_path = Some(PathBuf::from(path));
                    i += 1;
                }
                "--debug" | "-d" => {
                    run_args.debug = true;
                }
                "--check-runtime" => {
                    match args.get(i + 1).filter(|next| !next.starts_with('-')) {
                        Some(runtime) => {
                            check_runtime = Some(runtime.clone());
                            i += 1;
                        }
                        None => check_runtime = Some(DEFAULT_CONTAINER_RUNTIME.to_string()),
                    }
                }
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                arg if arg.starts_with('-') => {
                    anyhow::bail!("Unknown option: {}", arg);
                }
                arg => {
                    // A bare argument is the session file
                    run_args.config_path = Some(PathBuf::from(arg));
                }
            }
            i += 1;
        }

        Ok(match check_runtime {
            Some(runtime) => Command::CheckRuntime {
                runtime,
                debug: run_args.debug,
            },
            None => Command::Run(run_args),
        })
    }
}

/// Print help information
fn print_help() {
    println!("installer-harness - drive interactive installers unattended");
    println!();
    println!("USAGE:");
    println!("    installer-harness [OPTIONS] [SESSION_FILE]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>         Session file (TOML or JSON)");
    println!("    -d, --debug                 Enable debug logging");
    println!("        --check-runtime [NAME]  Exit 0 if the container runtime (default: docker) is installed");
    println!("    -h, --help                  Print this help message");
    println!("    -V, --version               Print version information");
    println!();
    println!("SESSION FILE:");
    println!("    Searched in the following order when not given:");
    println!("    1. $INSTALLER_HARNESS_CONFIG");
    println!("    2. ./installer-harness.toml (or .json)");
    println!("    3. <config dir>/installer-harness/session.toml");
    println!("    4. ~/.installer-harness/session.toml");
    println!();
    println!("ENVIRONMENT:");
    println!("    INSTALLER_HARNESS_DEBUG  Enable debug logging (1 or true)");
    println!("    RUST_LOG                 Set logging level (error, warn, info, debug, trace)");
}

/// Logs go to stderr so the report on stdout stays machine-readable
fn init_logging(debug: bool) {
    let debug_env = env::var("INSTALLER_HARNESS_DEBUG")
        .map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"));
    let log_level = if debug || debug_env { "debug" } else { "info" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// JSON report printed after a run
#[derive(Debug, Serialize)]
struct SessionReport<'a> {
    success: bool,
    exit_code: Option<i32>,
    duration_ms: i64,
    stdout: &'a str,
    stderr: &'a str,
    exchanges: &'a [PromptExchange],
    inventory: Option<&'a Inventory>,
    inventory_error: Option<String>,
}

impl<'a> From<&'a SessionResult> for SessionReport<'a> {
    fn from(result: &'a SessionResult) -> Self {
        Self {
            success: result.success(),
            exit_code: result.exit_code(),
            duration_ms: result.duration().num_milliseconds(),
            stdout: &result.stdout,
            stderr: &result.stderr,
            exchanges: &result.exchanges,
            inventory: result.inventory(),
            inventory_error: result.inventory_error().map(ToString::to_string),
        }
    }
}

async fn run_session(args: RunArgs) -> anyhow::Result<i32> {
    let config = match &args.config_path {
        Some(path) => {
            debug!("Loading session file: {}", path.display());
            ConfigLoader::load_from_path(path)
        }
        None => ConfigLoader::load(),
    }
    .context("Failed to load session file")?;

    let session = InstallationSession::new(config);
    let result = session.run().await.context("Installer session failed")?;

    let report = SessionReport::from(&result);
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(
        "Session finished in {} ms with {} prompt(s) answered",
        report.duration_ms,
        result.exchanges.len()
    );
    Ok(result.exit_code().unwrap_or(1))
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}", e);
            print_help();
            process::exit(2);
        }
    };

    let code = match command {
        Command::Help => {
            print_help();
            0
        }
        Command::Version => {
            println!("installer-harness v{}", installer_harness::VERSION);
            0
        }
        Command::CheckRuntime { runtime, debug } => {
            init_logging(debug);
            let available = is_runtime_available(&runtime);
            println!(
                "{} is {}",
                runtime,
                if available { "available" } else { "not available" }
            );
            if available {
                0
            } else {
                1
            }
        }
        Command::Run(run_args) => {
            init_logging(run_args.debug);
            info!("Starting installer-harness v{}", installer_harness::VERSION);
            match run_session(run_args).await {
                Ok(code) => code,
                Err(e) => {
                    error!("{:#}", e);
                    1
                }
            }
        }
    };

    process::exit(code);
}
