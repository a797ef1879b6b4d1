//! Node diagnostic bundles.
//!
//! Collection runs the configured probes, copies the configured files,
//! passes every text through the [`Redactor`], and packs the result into a
//! single `.tar.gz`. Work is staged in a temporary directory that is
//! removed when collection finishes, successfully or not.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

pub mod archive;
pub mod probe;
pub mod redact;

pub use probe::{default_commands, CommandProbe, ProbeCommand, ProbeOutput, ProbeStatus, SystemProbe};
pub use redact::{Redacted, RedactionRule, Redactor, RuleSpec};

/// Name of the index file written at the bundle root.
pub const MANIFEST_NAME: &str = "MANIFEST.txt";

/// Result type for diagnostic collection.
pub type DiagnosticsResult<T> = Result<T, DiagnosticsError>;

/// Diagnostic collection errors.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid redaction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("output directory does not exist: {0}")]
    MissingOutputDir(PathBuf),

    #[error("archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// What to collect and where to put it.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub commands: Vec<ProbeCommand>,
    pub config_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// Outcome of one collected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Collected { redactions: usize },
    Missing,
    Unreadable(String),
    ProbeFailed(String),
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Collected { redactions } => write!(f, "ok ({} redacted)", redactions),
            EntryStatus::Missing => f.write_str("missing"),
            EntryStatus::Unreadable(reason) => write!(f, "unreadable: {}", reason),
            EntryStatus::ProbeFailed(reason) => write!(f, "probe {}", reason),
        }
    }
}

/// One line of the bundle manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Where the item came from (command line or source path).
    pub source: String,
    /// Path inside the bundle, if anything was written.
    pub stored_as: Option<String>,
    pub status: EntryStatus,
}

/// Summary of a finished collection.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub archive: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

impl CollectionReport {
    pub fn total_redactions(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match e.status {
                EntryStatus::Collected { redactions } => redactions,
                _ => 0,
            })
            .sum()
    }
}

/// Bundle name for a collection started at `at`: `diagnostics-<UTC time>`.
pub fn bundle_name(at: SystemTime) -> String {
    let stamp = humantime::format_rfc3339_seconds(at).to_string();
    format!("diagnostics-{}", stamp.replace(':', "-"))
}

/// Flatten an absolute source path into a single file name.
fn stored_file_name(path: &Path) -> String {
    let flat: String = path
        .to_string_lossy()
        .trim_start_matches(['/', '\\'])
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == ':' { '_' } else { c })
        .collect();
    if flat.is_empty() {
        "root".to_string()
    } else {
        flat
    }
}

/// Collect, redact and archive.
pub async fn collect<P: SystemProbe + ?Sized>(
    probe: &P,
    redactor: &Redactor,
    options: &CollectOptions,
) -> DiagnosticsResult<CollectionReport> {
    if !options.output_dir.is_dir() {
        return Err(DiagnosticsError::MissingOutputDir(options.output_dir.clone()));
    }

    let name = bundle_name(SystemTime::now());
    let staging = tempfile::TempDir::new()?;
    let root = staging.path().join(&name);
    let commands_dir = root.join("commands");
    let files_dir = root.join("files");
    tokio::fs::create_dir_all(&commands_dir).await?;
    tokio::fs::create_dir_all(&files_dir).await?;

    let mut entries = Vec::new();

    for command in &options.commands {
        let output = probe.run(command).await;
        let redacted = redactor.redact(&output.render(command));
        tokio::fs::write(commands_dir.join(&command.file_name), &redacted.text).await?;

        let status = match &output.status {
            ProbeStatus::Exited(_) => EntryStatus::Collected {
                redactions: redacted.total(),
            },
            other => EntryStatus::ProbeFailed(other.to_string()),
        };
        entries.push(ManifestEntry {
            source: command.command_line(),
            stored_as: Some(format!("commands/{}", command.file_name)),
            status,
        });
    }

    for path in &options.config_paths {
        let entry = match tokio::fs::read(path).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let redacted = redactor.redact(&text);
                let stored = stored_file_name(path);
                tokio::fs::write(files_dir.join(&stored), &redacted.text).await?;
                if !redacted.hits.is_empty() {
                    tracing::debug!(path = %path.display(), hits = ?redacted.hits, "redacted file");
                }
                ManifestEntry {
                    source: path.display().to_string(),
                    stored_as: Some(format!("files/{}", stored)),
                    status: EntryStatus::Collected {
                        redactions: redacted.total(),
                    },
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ManifestEntry {
                source: path.display().to_string(),
                stored_as: None,
                status: EntryStatus::Missing,
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read file");
                ManifestEntry {
                    source: path.display().to_string(),
                    stored_as: None,
                    status: EntryStatus::Unreadable(e.to_string()),
                }
            }
        };
        entries.push(entry);
    }

    tokio::fs::write(root.join(MANIFEST_NAME), render_manifest(&name, redactor, &entries)).await?;

    let archive = options.output_dir.join(format!("{}.tar.gz", name));
    let (source, target) = (root.clone(), archive.clone());
    tokio::task::spawn_blocking(move || archive::write_tar_gz(&source, &target)).await??;
    tracing::info!(archive = %archive.display(), items = entries.len(), "diagnostics bundle written");

    Ok(CollectionReport { archive, entries })
}

fn render_manifest(name: &str, redactor: &Redactor, entries: &[ManifestEntry]) -> String {
    let mut out = format!(
        "{}\nnodeops {}\nredaction rules: {}\n\n",
        name,
        env!("CARGO_PKG_VERSION"),
        redactor.rule_names().collect::<Vec<_>>().join(", ")
    );
    for entry in entries {
        out.push_str(&format!(
            "{} -> {} [{}]\n",
            entry.source,
            entry.stored_as.as_deref().unwrap_or("-"),
            entry.status
        ));
    }
    out
}
