use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub mod artifacts;
pub mod config;
pub mod diagnostics;
pub mod init_config;
pub mod proposal;
pub mod version;

use config::{default_config_path, NodeopsConfig, RPC_URL_ENV};

#[derive(Parser)]
#[command(name = "nodeops")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator tools for a Namada node", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.local/share/nodeops/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive; overrides RUST_LOG and the config file
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode and display a governance proposal
    Proposal {
        /// Proposal ID to query
        #[arg(short = 'i', long, default_value_t = 0)]
        proposal_id: u64,

        /// Node RPC endpoint (overrides RPC_URL and the config file)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Print the proposal as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download CI artifacts and print wasm checksums
    Artifacts {
        /// Workflow run ID to download artifacts from (default: latest)
        #[arg(short = 'r', long)]
        run_id: Option<u64>,

        /// Root directory for downloaded artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Repository as owner/repo or a GitHub URL
        #[arg(long)]
        repo: Option<String>,
    },

    /// Collect a redacted diagnostics bundle
    Diagnostics {
        /// Directory the .tar.gz bundle is written to
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// systemd unit the node runs as
        #[arg(long)]
        service: Option<String>,

        /// Number of journal lines to capture
        #[arg(long)]
        journal_lines: Option<u32>,
    },

    /// Write a commented default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    // init-config must work even when the existing file is unreadable
    if let Commands::InitConfig { force } = cli.command {
        init_logging(cli.log_level.as_deref(), None)?;
        return init_config::execute(&config_path, force);
    }

    let mut config = load_config(&config_path, cli.config.is_some())?;
    config.apply_env(std::env::var(RPC_URL_ENV).ok());
    init_logging(cli.log_level.as_deref(), Some(&config.logging.level))?;
    if let Ok(path) = std::env::var(LOADED_ENV_FILE_VAR) {
        tracing::debug!(path = %path, "loaded environment file");
    }

    match cli.command {
        Commands::Proposal {
            proposal_id,
            rpc_url,
            json,
        } => proposal::execute(&config, proposal_id, rpc_url, json).await,
        Commands::Artifacts {
            run_id,
            output_dir,
            repo,
        } => artifacts::execute(&config, run_id, output_dir, repo).await,
        Commands::Diagnostics {
            output_dir,
            service,
            journal_lines,
        } => diagnostics::execute(&config, output_dir, service, journal_lines).await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
        Commands::InitConfig { .. } => Ok(()),
    }
}

/// An explicitly named config file must exist; the default one may not.
fn load_config(path: &Path, explicit: bool) -> Result<NodeopsConfig, config::ConfigError> {
    if explicit {
        NodeopsConfig::load(path)
    } else {
        NodeopsConfig::load_or_default(path)
    }
}

const ENV_FILE_VAR: &str = "NODEOPS_ENV_FILE";
const LOADED_ENV_FILE_VAR: &str = "_NODEOPS_LOADED_ENV_FILE";

/// Load environment variables from `NODEOPS_ENV_FILE` or `.env`.
///
/// A missing file is fine; values already in the environment win.
pub fn load_env_file() {
    let env_file = std::env::var(ENV_FILE_VAR).unwrap_or_else(|_| ".env".to_string());

    match dotenvy::from_filename(&env_file) {
        Ok(path) => {
            // tracing is not initialized yet
            std::env::set_var(LOADED_ENV_FILE_VAR, path.display().to_string());
        }
        Err(e) => {
            if !matches!(e, dotenvy::Error::Io(_)) {
                eprintln!("Warning: failed to load {}: {}", env_file, e);
            }
        }
    }
}

/// Filter directive by precedence: flag, then `RUST_LOG`, then config, then `warn`.
fn log_directive(flag: Option<&str>, rust_log: Option<String>, config_level: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .or_else(|| config_level.map(str::to_string))
        .unwrap_or_else(|| "warn".to_string())
}

/// Initialize the stderr subscriber. Stdout is reserved for command output.
pub fn init_logging(
    flag: Option<&str>,
    config_level: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let directive = log_directive(flag, std::env::var("RUST_LOG").ok(), config_level);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| format!("invalid log level '{}': {}", directive, e))?;

    // A subscriber may already be set (e.g. by a test harness)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
