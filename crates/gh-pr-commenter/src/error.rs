//! Error types for session setup and comment writes

use crate::retry::RetryError;
use std::time::Duration;
use thiserror::Error;

/// A pull request file whose change metadata could not be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("{file}: the patch details could not be resolved")]
    PatchUnresolved { file: String },

    #[error("{file}: the commit ref could not be resolved from '{contents_url}'")]
    RefUnresolved { file: String, contents_url: String },
}

impl PatchError {
    /// The file this error belongs to
    pub fn file(&self) -> &str {
        match self {
            PatchError::PatchUnresolved { file } | PatchError::RefUnresolved { file, .. } => file,
        }
    }
}

/// Errors that prevent a commenting session from being created
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid commenter configuration")]
    InvalidConfig(#[source] anyhow::Error),

    #[error("no GitHub token available")]
    MissingToken(#[source] anyhow::Error),

    #[error("failed to create GitHub client")]
    Client(#[source] anyhow::Error),

    #[error("PR number [{pr_number}] not found for {owner}/{repo}")]
    PullRequestNotFound {
        owner: String,
        repo: String,
        pr_number: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to fetch {what}")]
    Fetch {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("there were errors processing the PR files:\n{}", join_lines(.0))]
    ChangeSet(Vec<PatchError>),
}

fn join_lines(errors: &[PatchError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors returned by a single comment write
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("{file}:{line} is not part of the pull request diff")]
    InvalidTarget { file: String, line: u32 },

    #[error("{file}: invalid line span {start_line}..{end_line}")]
    InvalidSpan {
        file: String,
        start_line: u32,
        end_line: u32,
    },

    #[error("GitHub abuse rate limit still active after {attempts} attempts ({elapsed:?} elapsed)")]
    RateLimitExhausted {
        attempts: u32,
        elapsed: Duration,
        /// The rate limit error of the final attempt
        #[source]
        last: anyhow::Error,
    },

    #[error("failed to write comment")]
    RemoteWrite(#[source] anyhow::Error),

    #[error("failed to delete existing comment {comment_id}")]
    DeleteFailed {
        comment_id: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("existing comment {deleted_id} was deleted but its replacement was not created")]
    ReplaceIncomplete {
        deleted_id: u64,
        #[source]
        source: Box<CommentError>,
    },
}

impl From<RetryError> for CommentError {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::RateLimitExhausted {
                attempts,
                elapsed,
                last,
            } => CommentError::RateLimitExhausted {
                attempts,
                elapsed,
                last,
            },
            RetryError::Fatal(source) => CommentError::RemoteWrite(source),
        }
    }
}
