//! nodeops configuration file handling
//!
//! Every setting has a default, so a missing file or a file with only some
//! sections is valid. Secrets are never read from here: the CI token comes
//! from the `GITHUB_TOKEN` environment variable only.

use nodeops::artifacts::{DEFAULT_API_BASE, DEFAULT_REPO};
use nodeops::diagnostics::RuleSpec;
use nodeops::proposal::DEFAULT_ADDRESS_HRP;
use nodeops::rpc::client::DEFAULT_RPC_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default log level when neither the flag, `RUST_LOG`, nor the file set one
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable that overrides `[rpc].url`
pub const RPC_URL_ENV: &str = "RPC_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file '{0}' already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeopsConfig {
    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub address: AddressConfig,

    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Node RPC endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_url")]
    pub url: String,

    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

/// Address rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressConfig {
    /// bech32m human-readable part
    #[serde(default = "default_hrp")]
    pub hrp: String,
}

/// CI artifact source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_repo")]
    pub repo: String,

    /// Root of `<run_id>/<artifact_name>/`
    #[serde(default = "default_artifacts_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// systemd unit the node runs as
    #[serde(default = "default_service")]
    pub service: String,

    #[serde(default = "default_journal_lines")]
    pub journal_lines: u32,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Files copied (redacted) into the bundle
    #[serde(default = "default_config_paths")]
    pub config_paths: Vec<PathBuf>,

    #[serde(default = "default_diagnostics_dir")]
    pub output_dir: PathBuf,

    /// Redaction rules applied after the built-in ones
    #[serde(default)]
    pub extra_redactions: Vec<RuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_rpc_timeout() -> u64 {
    30
}

fn default_hrp() -> String {
    DEFAULT_ADDRESS_HRP.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_owner() -> String {
    default_repo_ref().0
}

fn default_repo() -> String {
    default_repo_ref().1
}

fn default_repo_ref() -> (String, String) {
    match DEFAULT_REPO.parse::<nodeops::artifacts::RepoRef>() {
        Ok(repo) => (repo.owner, repo.name),
        Err(_) => ("anoma".to_string(), "namada-governance-upgrades".to_string()),
    }
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_service() -> String {
    "namada".to_string()
}

fn default_journal_lines() -> u32 {
    500
}

fn default_command_timeout() -> u64 {
    30
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/systemd/system/namada.service")];
    if let Some(data_dir) = dirs::data_dir() {
        paths.push(data_dir.join("namada").join("global-config.toml"));
    }
    paths
}

fn default_diagnostics_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_secs: default_rpc_timeout(),
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self { hrp: default_hrp() }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: default_owner(),
            repo: default_repo(),
            output_dir: default_artifacts_dir(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            journal_lines: default_journal_lines(),
            command_timeout_secs: default_command_timeout(),
            config_paths: default_config_paths(),
            output_dir: default_diagnostics_dir(),
            extra_redactions: Vec::new(),
        }
    }
}

impl DiagnosticsConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl NodeopsConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        write_file(path, &contents)
    }

    /// Apply environment overrides (`RPC_URL`)
    pub fn apply_env(&mut self, rpc_url: Option<String>) {
        if let Some(url) = rpc_url.filter(|u| !u.trim().is_empty()) {
            self.rpc.url = url;
        }
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        let defaults = Self::default();
        let config_paths = defaults
            .diagnostics
            .config_paths
            .iter()
            .map(|p| format!("    \"{}\",", p.display()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"# nodeops configuration
#
# Every key is optional; missing keys use the values shown here.
# The CI token is read from GITHUB_TOKEN (environment or .env), never from this file.

[rpc]
# Node RPC endpoint (RPC_URL in the environment overrides this)
url = "{rpc_url}"
timeout_secs = {rpc_timeout}

[address]
# bech32m human-readable part used to render addresses
hrp = "{hrp}"

[artifacts]
api_base = "{api_base}"
owner = "{owner}"
repo = "{repo}"
# Artifacts are unpacked into <output_dir>/<run_id>/<artifact_name>/
output_dir = "{artifacts_dir}"

[diagnostics]
# systemd unit the node runs as
service = "{service}"
journal_lines = {journal_lines}
command_timeout_secs = {command_timeout}
output_dir = "{diagnostics_dir}"
# Files copied into the bundle after redaction
config_paths = [
{config_paths}
]

# Extra redaction rules, applied after the built-in ones
# [[diagnostics.extra_redactions]]
# name = "moniker"
# pattern = 'moniker = "[^"]*"'
# replacement = 'moniker = "[REDACTED]"'

[logging]
# Log level: trace, debug, info, warn, error
# (--log-level and RUST_LOG take precedence)
level = "{level}"
"#,
            rpc_url = defaults.rpc.url,
            rpc_timeout = defaults.rpc.timeout_secs,
            hrp = defaults.address.hrp,
            api_base = defaults.artifacts.api_base,
            owner = defaults.artifacts.owner,
            repo = defaults.artifacts.repo,
            artifacts_dir = defaults.artifacts.output_dir.display(),
            service = defaults.diagnostics.service,
            journal_lines = defaults.diagnostics.journal_lines,
            command_timeout = defaults.diagnostics.command_timeout_secs,
            diagnostics_dir = defaults.diagnostics.output_dir.display(),
            config_paths = config_paths,
            level = defaults.logging.level,
        )
    }

    /// Write the commented default file to `config_path`
    pub fn create_default(config_path: &Path, force: bool) -> Result<(), ConfigError> {
        if config_path.exists() && !force {
            return Err(ConfigError::AlreadyExists(config_path.to_path_buf()));
        }
        write_file(config_path, &Self::generate_default_toml())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    // Create parent directory if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, contents).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Get the default config file path
///
/// - Linux: ~/.local/share/nodeops/config.toml
/// - macOS: ~/Library/Application Support/nodeops/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nodeops")
        .join("config.toml")
}
