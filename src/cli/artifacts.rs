use super::config::NodeopsConfig;
use nodeops::artifacts::{
    download_artifacts, resolve_run, ExtractOutcome, GitHubClient, RepoRef, RunDownload,
    WorkflowRun,
};
use std::path::PathBuf;

/// Environment variable holding the CI API token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Lines printed once the run is resolved, before any download starts.
pub fn format_run_header(run: &WorkflowRun) -> Vec<String> {
    vec![
        format!("Workflow: {}", run.name.as_deref().unwrap_or("(unnamed)")),
        format!("Commit: {}", run.head_sha),
        String::new(),
    ]
}

/// Lines printed for a finished download.
pub fn format_download(download: &RunDownload) -> Vec<String> {
    let mut lines = Vec::new();

    for (artifact, outcome) in &download.artifacts {
        match outcome {
            ExtractOutcome::Extracted { checksums, .. } => {
                lines.extend(checksums.iter().map(|c| c.to_string()));
            }
            ExtractOutcome::KeptArchive { path, reason } => {
                lines.push(format!(
                    "Artifact {} could not be extracted ({}); kept {}",
                    artifact.name,
                    reason,
                    path.display()
                ));
            }
        }
    }
    for artifact in &download.expired {
        lines.push(format!("Artifact {} has expired", artifact.name));
    }
    lines
}

/// Download CI artifacts and print wasm checksums
pub async fn execute(
    config: &NodeopsConfig,
    run_id: Option<u64>,
    output_dir: Option<PathBuf>,
    repo: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| format!("{} not set (environment or .env file)", TOKEN_ENV))?;

    let repo = match repo {
        Some(repo_arg) => repo_arg.parse::<RepoRef>()?,
        None => RepoRef {
            owner: config.artifacts.owner.clone(),
            name: config.artifacts.repo.clone(),
        },
    };
    let output_root = output_dir.unwrap_or_else(|| config.artifacts.output_dir.clone());

    let client = GitHubClient::new(&config.artifacts.api_base, repo, &token)?;
    let run = resolve_run(&client, run_id).await?;
    for line in format_run_header(&run) {
        println!("{}", line);
    }

    let download = download_artifacts(&client, run, &output_root).await?;
    for line in format_download(&download) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeops::artifacts::{Artifact, WasmChecksum};

    fn artifact(id: u64, name: &str, expired: bool) -> Artifact {
        Artifact {
            id,
            name: name.to_string(),
            size_in_bytes: 1024,
            expired,
        }
    }

    #[test]
    fn test_format_download() {
        let download = RunDownload {
            run: WorkflowRun {
                id: 9,
                name: Some("Build wasm".to_string()),
                head_sha: "abc123".to_string(),
            },
            artifacts: vec![
                (
                    artifact(1, "wasm", false),
                    ExtractOutcome::Extracted {
                        dir: PathBuf::from("artifacts/9/wasm"),
                        checksums: vec![WasmChecksum {
                            path: PathBuf::from("proposal.wasm"),
                            sha256: "AB".repeat(32),
                        }],
                    },
                ),
                (
                    artifact(2, "broken", false),
                    ExtractOutcome::KeptArchive {
                        path: PathBuf::from("artifacts/9/broken/artifact_2.zip"),
                        reason: "invalid Zip archive".to_string(),
                    },
                ),
            ],
            expired: vec![artifact(3, "old", true)],
        };

        let header = format_run_header(&download.run);
        assert_eq!(header, vec!["Workflow: Build wasm", "Commit: abc123", ""]);

        let lines = format_download(&download);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("Data Hash proposal.wasm: {}", "AB".repeat(32)));
        assert!(lines[1].starts_with("Artifact broken could not be extracted"));
        assert_eq!(lines[2], "Artifact old has expired");
    }

    #[test]
    fn test_format_run_header_unnamed_run() {
        let run = WorkflowRun {
            id: 1,
            name: None,
            head_sha: "def".to_string(),
        };
        assert_eq!(format_run_header(&run)[0], "Workflow: (unnamed)");
    }
}
