//! CI artifact download and verification.
//!
//! Fetches the artifacts of a GitHub Actions run, unpacks them under
//! `<output_root>/<run_id>/<artifact_name>/`, and lists the SHA-256 of every
//! wasm module so it can be compared with a proposal's data hash.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub mod client;
pub mod extract;

pub use client::{Artifact, GitHubClient, WorkflowRun, DEFAULT_API_BASE};
pub use extract::{extract_archive, sha256_file, wasm_checksums, ExtractOutcome, WasmChecksum};

/// Repository whose workflow artifacts are downloaded by default.
pub const DEFAULT_REPO: &str = "https://github.com/anoma/namada-governance-upgrades";

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Artifact download errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    #[error("no workflow runs found")]
    NoWorkflowRuns,

    #[error("token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("invalid repository '{0}', expected owner/repo or a GitHub URL")]
    InvalidRepo(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// `owner/name` of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = ArtifactError;

    /// Accepts `owner/repo` or a repository URL such as
    /// `https://github.com/owner/repo(.git)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = match trimmed.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
            None => trimmed,
        };

        let mut parts = path.trim_matches('/').split('/');
        match (parts.next(), parts.next()) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.trim_end_matches(".git").to_string(),
            }),
            _ => Err(ArtifactError::InvalidRepo(s.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Directory an artifact is unpacked into.
///
/// Path separators in the artifact name are replaced so the name cannot
/// escape the run directory.
pub fn artifact_dir(output_root: &Path, run_id: u64, artifact_name: &str) -> PathBuf {
    let safe_name: String = artifact_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let safe_name = match safe_name.as_str() {
        "" | "." | ".." => "artifact".to_string(),
        _ => safe_name,
    };
    output_root.join(run_id.to_string()).join(safe_name)
}

/// Everything downloaded for one workflow run.
#[derive(Debug, Clone)]
pub struct RunDownload {
    pub run: WorkflowRun,
    pub artifacts: Vec<(Artifact, ExtractOutcome)>,
    /// Artifacts listed by the run but no longer downloadable.
    pub expired: Vec<Artifact>,
}

/// Resolve `run_id`, or the latest run when `None`, to its metadata.
pub async fn resolve_run(client: &GitHubClient, run_id: Option<u64>) -> ArtifactResult<WorkflowRun> {
    let run_id = match run_id {
        Some(id) => id,
        None => client.latest_run_id().await?,
    };
    tracing::info!(run_id, repo = %client.repo(), "fetching artifacts for workflow run");
    client.workflow_run(run_id).await
}

/// Download and extract every unexpired artifact of `run`.
pub async fn download_artifacts(
    client: &GitHubClient,
    run: WorkflowRun,
    output_root: &Path,
) -> ArtifactResult<RunDownload> {
    let listed = client.list_artifacts(run.id).await?;
    if listed.is_empty() {
        tracing::info!(run_id = run.id, "no artifacts found for this workflow run");
    }

    let mut artifacts = Vec::with_capacity(listed.len());
    let mut expired = Vec::new();
    for artifact in listed {
        if artifact.expired {
            tracing::warn!(name = %artifact.name, "artifact has expired, skipping");
            expired.push(artifact);
            continue;
        }
        tracing::info!(
            name = %artifact.name,
            size = artifact.size_in_bytes,
            "found artifact"
        );
        let dir = artifact_dir(output_root, run.id, &artifact.name);
        let outcome = client.download_artifact(artifact.id, &dir).await?;
        artifacts.push((artifact, outcome));
    }

    Ok(RunDownload {
        run,
        artifacts,
        expired,
    })
}

/// Download every artifact of `run_id`, or of the latest run when `None`.
pub async fn download_run(
    client: &GitHubClient,
    run_id: Option<u64>,
    output_root: &Path,
) -> ArtifactResult<RunDownload> {
    let run = resolve_run(client, run_id).await?;
    download_artifacts(client, run, output_root).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_url() {
        let repo: RepoRef = DEFAULT_REPO.parse().unwrap();
        assert_eq!(repo.owner, "anoma");
        assert_eq!(repo.name, "namada-governance-upgrades");
        assert_eq!(repo.to_string(), "anoma/namada-governance-upgrades");
    }

    #[test]
    fn test_parse_repo_short_form() {
        let repo: RepoRef = "owner/tools.git".parse().unwrap();
        assert_eq!(repo.owner, "owner");
        assert_eq!(repo.name, "tools");
    }

    #[test]
    fn test_parse_repo_url_with_trailing_path() {
        let repo: RepoRef = "https://github.com/o/r/actions".parse().unwrap();
        assert_eq!(repo, RepoRef { owner: "o".into(), name: "r".into() });
    }

    #[test]
    fn test_parse_repo_invalid() {
        assert!("just-a-name".parse::<RepoRef>().is_err());
        assert!("https://github.com/".parse::<RepoRef>().is_err());
        assert!("".parse::<RepoRef>().is_err());
    }

    #[test]
    fn test_artifact_dir_layout() {
        let dir = artifact_dir(Path::new("artifacts"), 42, "wasm-build");
        assert_eq!(dir, PathBuf::from("artifacts/42/wasm-build"));
    }

    #[test]
    fn test_artifact_dir_sanitizes_name() {
        let dir = artifact_dir(Path::new("out"), 1, "../../etc");
        assert_eq!(dir, PathBuf::from("out/1/.._.._etc"));

        let dir = artifact_dir(Path::new("out"), 1, "..");
        assert_eq!(dir, PathBuf::from("out/1/artifact"));
    }
}
