//! End-to-end orchestration: parse the current (and optional baseline)
//! report, render the comment body, and post it to GitHub.

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Cli;
use crate::github::{ActionContext, Client};
use crate::lcov;
use crate::report::{self, Options};

/// GitHub rejects comment bodies longer than this.
pub const MAX_COMMENT_CHARS: usize = 65536;

pub fn run(cli: &Cli) -> Result<()> {
    let context = ActionContext::from_env()?;
    let client = Client::new(cli.token()?);

    let lcov_path = Path::new(&cli.working_dir).join(&cli.lcov_file);
    let raw = match std::fs::read_to_string(&lcov_path) {
        Ok(raw) => raw,
        Err(_) => {
            eprintln!(
                "No coverage report found at '{}', exiting...",
                lcov_path.display()
            );
            return Ok(());
        }
    };

    let base_raw = match &cli.lcov_base {
        Some(base_path) => match std::fs::read_to_string(base_path) {
            Ok(raw) => Some(raw),
            Err(_) => {
                eprintln!("No coverage report found at '{base_path}', ignoring...");
                None
            }
        },
        None => None,
    };

    let mut options = Options {
        repository: context.repository.clone(),
        commit: context.commit.clone().unwrap_or_default(),
        prefix: report::normalise_path(&format!("{}/", context.workspace)),
        working_dir: cli.working_dir.clone(),
        head: context.head.clone(),
        base: context.base.clone(),
        title: cli.title.clone().filter(|title| !title.is_empty()),
        should_filter_changed_files: cli.filter_changed_files,
        changed_files: Vec::new(),
    };

    if cli.filter_changed_files {
        let (base_commit, commit) = match (&context.base_commit, &context.commit) {
            (Some(base_commit), Some(commit)) => (base_commit, commit),
            _ => bail!(
                "The base and head commits are missing from the payload for this {} event.",
                context.event_name
            ),
        };
        options.changed_files = client.changed_files(&context.repository, base_commit, commit)?;
    }

    let records = lcov::parse(&raw)?;
    let baseline = match base_raw {
        Some(raw) => Some(lcov::parse(&raw)?),
        None => None,
    };

    let (body, coverage_diff) = report::diff(&records, baseline.as_deref(), &options);
    let body = truncate_comment(body);

    if cli.delete_old_comments {
        if let Some(pr_number) = context.pr_number {
            client.delete_old_comments(&context.repository, pr_number, options.title.as_deref())?;
        }
    }

    match context.event_name.as_str() {
        "pull_request" | "pull_request_target" => {
            if let Some(pr_number) = context.pr_number {
                client.create_issue_comment(&context.repository, pr_number, &body)?;
            }
        }
        "push" => {
            if let Some(commit) = &context.commit {
                client.create_commit_comment(&context.repository, commit, &body)?;
            }
        }
        _ => {}
    }

    if cli.fail_on_coverage_decrease && coverage_diff < 0.0 {
        bail!("Coverage decreased by {:.2}%", -coverage_diff);
    }

    Ok(())
}

/// Clip the rendered body to the comment length limit.
fn truncate_comment(body: String) -> String {
    if body.chars().count() <= MAX_COMMENT_CHARS {
        return body;
    }
    body.chars().take(MAX_COMMENT_CHARS).collect()
}
