//! GitHub API helpers: the REST client used for coverage comments and the
//! resolved Actions context for the current run.

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;

/// Marker text present in every posted body; used to find old comments.
const REPORT_MARKER: &str = "Coverage Report";

const COMMENTS_PER_PAGE: usize = 20;

const API_ROOT: &str = "https://api.github.com";

/// Minimal GitHub REST client backed by blocking `ureq` calls.
pub struct Client {
    token: String,
}

impl Client {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self { token }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        ureq::request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "covpost")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }

    /// List every comment on an issue/PR, fetching pages until a short
    /// page is returned.
    pub fn list_comments(&self, repo: &str, issue_number: u64) -> Result<Vec<IssueComment>> {
        let mut comments = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "{API_ROOT}/repos/{repo}/issues/{issue_number}/comments?per_page={COMMENTS_PER_PAGE}&page={page}"
            );
            let resp = self
                .request("GET", &url)
                .call()
                .context("Failed to list comments")?;
            let batch: Vec<IssueComment> =
                resp.into_json().context("Failed to parse comments JSON")?;
            let batch_len = batch.len();
            comments.extend(batch);
            if batch_len < COMMENTS_PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(comments)
    }

    /// Delete a single comment by id.
    pub fn delete_comment(&self, repo: &str, comment_id: u64) -> Result<()> {
        let url = format!("{API_ROOT}/repos/{repo}/issues/comments/{comment_id}");
        self.request("DELETE", &url)
            .call()
            .with_context(|| format!("Failed to delete comment {comment_id}"))?;
        Ok(())
    }

    /// Delete previous coverage comments on a PR. Failures are logged per
    /// comment and never abort the run.
    pub fn delete_old_comments(
        &self,
        repo: &str,
        issue_number: u64,
        title: Option<&str>,
    ) -> Result<()> {
        let comments = self.list_comments(repo, issue_number)?;
        for comment in comments
            .iter()
            .filter(|comment| is_old_report_comment(comment, title))
        {
            eprintln!("Deleting comment {}", comment.id);
            if let Err(err) = self.delete_comment(repo, comment.id) {
                eprintln!("Warning: {err:#}");
            }
        }
        Ok(())
    }

    /// Create a comment on a pull request.
    pub fn create_issue_comment(&self, repo: &str, issue_number: u64, body: &str) -> Result<()> {
        let url = format!("{API_ROOT}/repos/{repo}/issues/{issue_number}/comments");
        self.post_comment(&url, body)
    }

    /// Create a comment on a commit (push events).
    pub fn create_commit_comment(&self, repo: &str, sha: &str, body: &str) -> Result<()> {
        let url = format!("{API_ROOT}/repos/{repo}/commits/{sha}/comments");
        self.post_comment(&url, body)
    }

    fn post_comment(&self, url: &str, body: &str) -> Result<()> {
        match self
            .request("POST", url)
            .send_json(serde_json::json!({ "body": body }))
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                bail!("GitHub API error creating comment (HTTP {code}): {body}")
            }
            Err(err) => bail!("Failed to create comment: {err}"),
        }
    }

    /// Files added or modified between two commits, via the
    /// compare-two-commits API.
    pub fn changed_files(&self, repo: &str, base: &str, head: &str) -> Result<Vec<String>> {
        let url = format!("{API_ROOT}/repos/{repo}/compare/{base}...{head}");
        let resp = self
            .request("GET", &url)
            .call()
            .context("Failed to compare the base and head commits")?;
        let compare: CompareResponse = resp
            .into_json()
            .context("Failed to parse compare-commits JSON")?;
        Ok(compare
            .files
            .into_iter()
            .filter(|file| file.status == "modified" || file.status == "added")
            .map(|file| file.filename)
            .collect())
    }
}

/// A subset of the issue-comment payload.
#[derive(Debug, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<CommentUser>,
}

#[derive(Debug, Deserialize)]
pub struct CommentUser {
    pub login: String,
}

#[derive(Deserialize)]
struct CompareResponse {
    files: Vec<ChangedFile>,
}

#[derive(Deserialize)]
struct ChangedFile {
    filename: String,
    status: String,
}

/// A previously posted coverage comment: has a user, contains the report
/// marker, and mentions the configured title when one is set.
fn is_old_report_comment(comment: &IssueComment, title: Option<&str>) -> bool {
    let body = match &comment.body {
        Some(body) => body,
        None => return false,
    };
    comment.user.is_some()
        && body.contains(REPORT_MARKER)
        && title.map_or(true, |title| body.contains(title))
}

/// Resolved GitHub Actions context, read from environment variables and
/// the event payload.
#[derive(Debug, Default)]
pub struct ActionContext {
    pub event_name: String,
    /// Repository full name, e.g. `owner/repo`.
    pub repository: String,
    pub pr_number: Option<u64>,
    /// Head commit SHA.
    pub commit: Option<String>,
    /// Base commit SHA.
    pub base_commit: Option<String>,
    /// Head branch name (the pushed ref on push events).
    pub head: Option<String>,
    /// Base branch name (pull requests only).
    pub base: Option<String>,
    /// Checkout root; stripped from LCOV paths when rendering.
    pub workspace: String,
}

impl ActionContext {
    /// Build the context from the standard Actions environment
    /// (`GITHUB_EVENT_NAME`, `GITHUB_REPOSITORY`, `GITHUB_EVENT_PATH`,
    /// `GITHUB_REF`, `GITHUB_WORKSPACE`).
    pub fn from_env() -> Result<Self> {
        let event_name = std::env::var("GITHUB_EVENT_NAME")
            .context("GITHUB_EVENT_NAME environment variable is required")?;
        let repository = std::env::var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY environment variable is required")?;
        let event_path = std::env::var("GITHUB_EVENT_PATH")
            .context("GITHUB_EVENT_PATH environment variable is required")?;
        let payload = std::fs::read_to_string(Path::new(&event_path))
            .with_context(|| format!("Failed to read event payload at '{event_path}'"))?;
        let github_ref = std::env::var("GITHUB_REF").ok();
        let workspace = std::env::var("GITHUB_WORKSPACE").unwrap_or_default();
        Self::resolve(event_name, repository, &payload, github_ref, workspace)
    }

    /// Pure half of [`ActionContext::from_env`], split out for tests.
    fn resolve(
        event_name: String,
        repository: String,
        payload: &str,
        github_ref: Option<String>,
        workspace: String,
    ) -> Result<Self> {
        let payload: EventPayload =
            serde_json::from_str(payload).context("Failed to parse event payload JSON")?;

        let mut context = Self {
            event_name,
            repository,
            workspace,
            ..Self::default()
        };

        match context.event_name.as_str() {
            "pull_request" | "pull_request_target" => {
                let pr = payload
                    .pull_request
                    .context("Event payload has no pull_request")?;
                context.pr_number = Some(pr.number);
                context.commit = Some(pr.head.sha);
                context.base_commit = Some(pr.base.sha);
                context.head = Some(pr.head.branch);
                context.base = Some(pr.base.branch);
            }
            "push" => {
                context.commit = payload.after;
                context.base_commit = payload.before;
                context.head = github_ref;
            }
            _ => {}
        }

        Ok(context)
    }
}

#[derive(Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
    #[serde(default)]
    before: Option<String>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
    head: CommitRef,
    base: CommitRef,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
    #[serde(rename = "ref")]
    branch: String,
}
