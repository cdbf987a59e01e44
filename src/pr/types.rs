use serde::Deserialize;

/// A pull request with the changed files to check.
/// Built from the GitHub metadata response plus the paginated files listing,
/// or from a local diff.
#[derive(Debug, Clone)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL of the PR
    pub url: String,
    /// Author's GitHub login
    pub author: String,
    /// Changed files, in the order GitHub lists them
    pub files: Vec<FileDiff>,
}

/// A single changed file. Deserializes straight from an entry of
/// `GET /repos/{owner}/{repo}/pulls/{number}/files`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDiff {
    /// File path (e.g., "e2e/specs/send/send.spec.ts")
    pub filename: String,
    /// Unified-diff hunks; GitHub omits this for binary and very large files
    #[serde(default)]
    pub patch: Option<String>,
}

/// Represents the parsed components of a PR URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}
