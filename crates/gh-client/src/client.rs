//! GitHub client trait
//!
//! This module defines the core `GitHubClient` trait that all client
//! implementations must satisfy. The commenter only talks to GitHub
//! through this trait, so tests can substitute an in-memory client.

use crate::types::{NewReviewComment, PullRequest, PullRequestFile, ReviewComment};
use async_trait::async_trait;

/// GitHub API client trait
///
/// Defines the subset of the GitHub API needed to post review comments.
/// Failures should carry a [`crate::ApiError`] in their chain so callers
/// can tell rate limiting apart from other errors.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks and threads.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{GitHubClient, PullRequestFile};
///
/// async fn changed_files(client: &dyn GitHubClient) -> anyhow::Result<Vec<PullRequestFile>> {
///     client.fetch_pull_request_files("rust-lang", "rust", 1234).await
/// }
/// ```
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Fetch a single pull request by number
    ///
    /// Used as the existence check before a commenting session starts.
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `pr_number` - Pull request number
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest>;

    /// Fetch all changed files of a pull request, including their patches
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `pr_number` - Pull request number
    async fn fetch_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<PullRequestFile>>;

    /// Fetch review comments for a pull request
    ///
    /// Returns all review comments (line comments) on a PR, in the order
    /// GitHub lists them.
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `pr_number` - Pull request number
    async fn fetch_review_comments(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ReviewComment>>;

    /// Create a review comment on a line (or span) of a pull request
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `pr_number` - Pull request number
    /// * `comment` - Target file, line(s), commit, diff position and body
    ///
    /// # Returns
    ///
    /// The GitHub comment ID on success
    async fn create_review_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        comment: &NewReviewComment,
    ) -> anyhow::Result<u64>;

    /// Delete a review comment
    ///
    /// A comment that no longer exists counts as deleted and returns `Ok`.
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `comment_id` - The GitHub comment ID to delete
    async fn delete_review_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
    ) -> anyhow::Result<()>;

    /// Create an issue-level comment on the pull request conversation
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `pr_number` - Pull request number
    /// * `body` - Comment body text
    ///
    /// # Returns
    ///
    /// The GitHub comment ID on success
    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> anyhow::Result<u64>;
}
