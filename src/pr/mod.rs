pub mod diff;
pub mod types;

pub use types::{FileDiff, PrUrl, PullRequest};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GitHubConfig;

/// GitHub's files endpoint caps out at 3000 files (30 pages of 100).
const FILES_PER_PAGE: usize = 100;
const MAX_FILE_PAGES: usize = 30;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to parse diff: {0}")]
    DiffParse(String),

    #[error("Failed to read diff file: {0}")]
    DiffRead(#[from] std::io::Error),
}

/// Parse a PR URL into its component parts.
///
/// Expected format: https://{host}/{owner}/{repo}/pull/{number}, optionally
/// followed by a sub-page such as `/files`. Any host is accepted so GitHub
/// Enterprise URLs work.
pub fn parse_pr_url(url: &str) -> Result<PrUrl, PrError> {
    let invalid = || PrError::InvalidUrl(url.to_string());
    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() < 4 || segments[2] != "pull" {
        return Err(invalid());
    }

    let pr_number = segments[3].parse::<u64>().map_err(|_| invalid())?;

    Ok(PrUrl {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        pr_number,
    })
}

/// Source of the pull request to check.
#[async_trait]
pub trait PrProvider: Send + Sync {
    /// Short label for logs (e.g. "github", "mock")
    fn name(&self) -> &str;

    /// Load PR metadata and its changed files.
    async fn load(&self) -> Result<PullRequest, PrError>;
}

/// Fetches a pull request from the GitHub REST API. The PR URL is parsed
/// when loading, before any request is made.
pub struct GitHubProvider {
    pr_url: String,
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl GitHubProvider {
    pub fn new(pr_url: &str, config: &GitHubConfig) -> Self {
        Self {
            pr_url: pr_url.to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn pull_url(&self, pr: &PrUrl) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, pr.owner, pr.repo, pr.pr_number
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("User-Agent", "pr-migration-lint")
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_files(&self, pr: &PrUrl) -> Result<Vec<FileDiff>, PrError> {
        let files_url = format!("{}/files", self.pull_url(pr));
        let mut files = Vec::new();
        for page in 1..=MAX_FILE_PAGES {
            let batch = self
                .get(&files_url)
                .query(&[("per_page", FILES_PER_PAGE), ("page", page)])
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<FileDiff>>()
                .await?;
            debug!(page, received = batch.len(), "received PR files page");
            let last_page = batch.len() < FILES_PER_PAGE;
            files.extend(batch);
            if last_page {
                break;
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl PrProvider for GitHubProvider {
    fn name(&self) -> &str {
        "github"
    }

    #[instrument(skip(self), fields(pr_url = %self.pr_url))]
    async fn load(&self) -> Result<PullRequest, PrError> {
        #[derive(serde::Deserialize)]
        struct User {
            login: String,
        }

        #[derive(serde::Deserialize)]
        struct PullResponse {
            number: u64,
            title: String,
            html_url: String,
            user: User,
        }

        let pr_url = parse_pr_url(&self.pr_url)?;
        debug!(owner = %pr_url.owner, repo = %pr_url.repo, pr = pr_url.pr_number, "parsed PR URL");

        debug!("fetching PR metadata from GitHub API");
        let metadata = self
            .get(&self.pull_url(&pr_url))
            .send()
            .await?
            .error_for_status()?
            .json::<PullResponse>()
            .await?;
        debug!(title = %metadata.title, "received PR metadata");

        let files = self.fetch_files(&pr_url).await?;
        debug!(files = files.len(), "received PR files");

        Ok(PullRequest {
            number: metadata.number,
            title: metadata.title,
            url: metadata.html_url,
            author: metadata.user.login,
            files,
        })
    }
}

/// Reads a local `git diff` instead of calling GitHub.
pub struct DiffFileProvider {
    path: PathBuf,
}

impl DiffFileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PrProvider for DiffFileProvider {
    fn name(&self) -> &str {
        "diff-file"
    }

    async fn load(&self) -> Result<PullRequest, PrError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let files = diff::split_diff(&raw)?;
        debug!(path = %self.path.display(), files = files.len(), "split local diff");
        Ok(PullRequest {
            number: 0,
            title: format!("Local diff {}", self.path.display()),
            url: self.path.display().to_string(),
            author: "local".to_string(),
            files,
        })
    }
}

/// Built-in sample PR for demo purposes (no GitHub token needed).
pub struct MockProvider;

#[async_trait]
impl PrProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load(&self) -> Result<PullRequest, PrError> {
        let diff_text = include_str!("../../tests/fixtures/sample_diff.patch");
        let files = diff::split_diff(diff_text)?;
        Ok(PullRequest {
            number: 42,
            title: "Migrate send flow specs to the e2e framework".to_string(),
            url: "https://github.com/example/mobile/pull/42".to_string(),
            author: "alice".to_string(),
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_pr_url() {
        let url = parse_pr_url("https://github.com/org/repo/pull/42").unwrap();
        assert_eq!(url.owner, "org");
        assert_eq!(url.repo, "repo");
        assert_eq!(url.pr_number, 42);
    }

    #[test]
    fn test_parse_pr_url_with_sub_page() {
        let url = parse_pr_url("https://github.com/org/repo/pull/42/files").unwrap();
        assert_eq!(url.pr_number, 42);
    }

    #[test]
    fn test_parse_enterprise_pr_url() {
        let url = parse_pr_url("https://git.example.com/mobile/app/pull/7").unwrap();
        assert_eq!(url.owner, "mobile");
        assert_eq!(url.pr_number, 7);
    }

    #[test]
    fn test_parse_invalid_pr_url() {
        assert!(parse_pr_url("https://example.com").is_err());
        assert!(parse_pr_url("not-a-url").is_err());
        assert!(parse_pr_url("https://github.com/org/repo/pulls/42").is_err());
        assert!(parse_pr_url("https://github.com/org/repo/pull/abc").is_err());
        assert!(parse_pr_url("ftp://github.com/org/repo/pull/1").is_err());
    }

    #[test]
    fn test_invalid_url_error_keeps_input() {
        let err = parse_pr_url("https://github.com/org").unwrap_err();
        assert!(matches!(&err, PrError::InvalidUrl(u) if u == "https://github.com/org"));
        assert_eq!(err.to_string(), "Invalid PR URL: https://github.com/org");
    }

    #[test]
    fn test_github_provider_urls() {
        let config = GitHubConfig {
            token: None,
            api_url: "https://github.example.com/api/v3/".to_string(),
        };
        let pr_url = "https://github.com/o/r/pull/5";
        let provider = GitHubProvider::new(pr_url, &config);
        assert_eq!(
            provider.pull_url(&parse_pr_url(pr_url).unwrap()),
            "https://github.example.com/api/v3/repos/o/r/pulls/5"
        );
    }

    #[tokio::test]
    async fn test_github_provider_rejects_bad_url_before_fetching() {
        let config = GitHubConfig {
            token: None,
            // Unroutable, so any request attempt would surface as PrError::Fetch.
            api_url: "http://127.0.0.1:9".to_string(),
        };
        let provider = GitHubProvider::new("https://github.com/org/repo", &config);
        assert!(matches!(provider.load().await, Err(PrError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_loads_sample() {
        let pr = MockProvider.load().await.unwrap();
        assert_eq!(pr.number, 42);
        assert!(!pr.files.is_empty());
        assert!(pr.files.iter().any(|f| f.patch.is_none()));
    }

    #[tokio::test]
    async fn test_diff_file_provider_missing_file() {
        let provider = DiffFileProvider::new(PathBuf::from("/nonexistent/changes.diff"));
        assert!(matches!(provider.load().await, Err(PrError::DiffRead(_))));
    }

    #[tokio::test]
    async fn test_diff_file_provider_reads_diff() {
        let path = std::env::temp_dir().join("pr_migration_lint_provider_test.diff");
        std::fs::write(
            &path,
            "diff --git a/a.ts b/a.ts\n--- a/a.ts\n+++ b/a.ts\n@@ -1 +1 @@\n-x\n+y\n",
        )
        .unwrap();
        let pr = DiffFileProvider::new(path.clone()).load().await.unwrap();
        assert_eq!(pr.files.len(), 1);
        assert_eq!(pr.files[0].patch.as_deref(), Some("@@ -1 +1 @@\n-x\n+y"));
        std::fs::remove_file(&path).ok();
    }
}
