//! GitHub API data transfer objects
//!
//! These types represent the data exchanged with the GitHub API.
//! They are intentionally separate from the commenter's domain models
//! to keep this crate pure and reusable.

use serde::{Deserialize, Serialize};

/// A pull request from the GitHub API
///
/// Only used to check the pull request exists before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number (e.g., 123)
    pub number: u64,
}

/// Change status of a file in a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    /// Anything GitHub adds later
    #[serde(other)]
    Unknown,
}

/// A changed file of a pull request (`GET /pulls/{n}/files`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestFile {
    /// Path of the file relative to the repository root
    pub filename: String,

    /// Change status
    pub status: FileStatus,

    /// Unified diff fragment for this file; absent for binary or huge diffs
    #[serde(default)]
    pub patch: Option<String>,

    /// Number of changed lines (additions + deletions)
    #[serde(default)]
    pub changes: u64,

    /// Contents API URL, ending in `?ref=<commit sha>`
    #[serde(default)]
    pub contents_url: String,
}

impl PullRequestFile {
    /// Deleted files cannot receive line comments
    pub fn is_removed(&self) -> bool {
        self.status == FileStatus::Removed
    }
}

/// A review comment on a pull request
///
/// Only the fields needed to find an identical earlier comment are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    /// GitHub comment ID
    pub id: u64,
    /// File path the comment is on
    pub path: String,
    /// Comment body text
    #[serde(default)]
    pub body: String,
}

/// Payload for creating a review comment anchored to a diff line or span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReviewComment {
    /// Comment body text
    pub body: String,
    /// The SHA of the commit the comment is attached to
    pub commit_id: String,
    /// File path relative to repository root
    pub path: String,
    /// Absolute line in the post-change file (end of the span for multi-line)
    pub line: u32,
    /// Which side of the diff; line comments always target the new code
    pub side: String,
    /// Offset of `line` within the diff hunk, counted from the hunk header
    pub position: u32,
    /// First line of a multi-line span
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    /// Side of `start_line`, only present together with it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_side: Option<String>,
}

/// Side of the diff for additions and context lines
pub const SIDE_RIGHT: &str = "RIGHT";

impl NewReviewComment {
    /// Create a single-line comment payload
    pub fn single_line(
        path: impl Into<String>,
        body: impl Into<String>,
        commit_id: impl Into<String>,
        line: u32,
        position: u32,
    ) -> Self {
        Self {
            body: body.into(),
            commit_id: commit_id.into(),
            path: path.into(),
            line,
            side: SIDE_RIGHT.to_string(),
            position,
            start_line: None,
            start_side: None,
        }
    }

    /// Turn this payload into a span starting at `start_line`
    pub fn with_start_line(mut self, start_line: u32) -> Self {
        self.start_line = Some(start_line);
        self.start_side = Some(SIDE_RIGHT.to_string());
        self
    }
}
