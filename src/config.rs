//! CLI surface. Flag names mirror the original action inputs so a
//! workflow invocation reads like the configuration it carries.

use anyhow::Context as _;
use clap::Parser;

/// covpost — post LCOV coverage reports as GitHub pull request comments.
#[derive(Debug, Parser)]
#[command(name = "covpost", version, about)]
pub struct Cli {
    /// GitHub API token. Falls back to the GITHUB_TOKEN environment
    /// variable.
    #[arg(long)]
    pub github_token: Option<String>,

    /// Directory the coverage run executed in.
    #[arg(long, default_value = "./")]
    pub working_dir: String,

    /// Path to the LCOV report, relative to the working directory.
    #[arg(long, default_value = "./coverage/lcov.info")]
    pub lcov_file: String,

    /// Path to a baseline LCOV report to diff against.
    #[arg(long)]
    pub lcov_base: Option<String>,

    /// Restrict the report to files changed between the base and head
    /// commits.
    #[arg(long)]
    pub filter_changed_files: bool,

    /// Delete previous coverage comments before posting.
    #[arg(long)]
    pub delete_old_comments: bool,

    /// Heading shown above the report.
    #[arg(long)]
    pub title: Option<String>,

    /// Fail the run when coverage decreased relative to the baseline.
    #[arg(long)]
    pub fail_on_coverage_decrease: bool,
}

impl Cli {
    /// Resolve the API token from the flag or the environment.
    pub fn token(&self) -> anyhow::Result<String> {
        if let Some(token) = &self.github_token {
            return Ok(token.clone());
        }
        std::env::var("GITHUB_TOKEN")
            .context("A GitHub token is required (--github-token or GITHUB_TOKEN)")
    }
}
