//! GitHub Actions REST client.

use super::extract::{extract_archive, ExtractOutcome};
use super::{ArtifactError, ArtifactResult, RepoRef};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Public GitHub API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// A workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub head_sha: String,
}

/// An artifact uploaded by a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    pub size_in_bytes: u64,
    #[serde(default)]
    pub expired: bool,
}

#[derive(Debug, Deserialize)]
struct RunList {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct ArtifactList {
    artifacts: Vec<Artifact>,
}

/// Authenticated client scoped to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    repo: RepoRef,
}

impl GitHubClient {
    pub fn new(api_base: &str, repo: RepoRef, token: &str) -> ArtifactResult<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| ArtifactError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("nodeops/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo,
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.repo.owner, self.repo.name, suffix
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ArtifactResult<T> {
        tracing::debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ArtifactError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }

    /// Id of the most recent workflow run.
    pub async fn latest_run_id(&self) -> ArtifactResult<u64> {
        let runs: RunList = self.get_json(&self.repo_url("actions/runs")).await?;
        let latest = runs
            .workflow_runs
            .first()
            .ok_or(ArtifactError::NoWorkflowRuns)?;
        tracing::debug!(run_id = latest.id, "found latest run");
        Ok(latest.id)
    }

    pub async fn workflow_run(&self, run_id: u64) -> ArtifactResult<WorkflowRun> {
        self.get_json(&self.repo_url(&format!("actions/runs/{}", run_id)))
            .await
    }

    pub async fn list_artifacts(&self, run_id: u64) -> ArtifactResult<Vec<Artifact>> {
        let list: ArtifactList = self
            .get_json(&self.repo_url(&format!("actions/runs/{}/artifacts", run_id)))
            .await?;
        Ok(list.artifacts)
    }

    /// Download an artifact's zip into `output_dir` and extract it there.
    ///
    /// The zip is removed after a successful extraction. A zip that cannot
    /// be read is left in place and reported as [`ExtractOutcome::KeptArchive`].
    pub async fn download_artifact(
        &self,
        artifact_id: u64,
        output_dir: &Path,
    ) -> ArtifactResult<ExtractOutcome> {
        let url = self.repo_url(&format!("actions/artifacts/{}/zip", artifact_id));
        let mut resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ArtifactError::Http {
                status: status.as_u16(),
                url,
                body,
            });
        }

        tokio::fs::create_dir_all(output_dir).await?;
        let zip_path: PathBuf = output_dir.join(format!("artifact_{}.zip", artifact_id));
        tracing::info!(path = %zip_path.display(), "downloading artifact");

        let mut file = tokio::fs::File::create(&zip_path).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);
        tracing::debug!(bytes = written, "artifact download complete");

        let output_dir = output_dir.to_path_buf();
        tokio::task::spawn_blocking(move || extract_archive(&zip_path, &output_dir)).await?
    }
}
