//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab library.
//! Every failure is converted into an [`ApiError`] before it leaves this module.
//! Deleting a comment that no longer exists succeeds.

use crate::client::GitHubClient;
use crate::error::{ApiError, STATUS_NOT_FOUND};
use crate::types::{NewReviewComment, PullRequest, PullRequestFile, ReviewComment};
use anyhow::Context;
use async_trait::async_trait;
use log::{debug, warn};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PER_PAGE: usize = 100;

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// GET every page of a list endpoint until an empty or short page
    async fn get_all_pages<T>(&self, route: &str) -> anyhow::Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let mut items = Vec::new();
        let mut page_num = 1usize;

        loop {
            let params = [("per_page", PER_PAGE), ("page", page_num)];
            let page: Vec<T> = self
                .octocrab
                .get(route, Some(&params))
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("GET {} (page {})", route, page_num))?;

            let page_len = page.len();
            items.extend(page);

            if page_len < PER_PAGE {
                break;
            }
            page_num += 1;
        }

        Ok(items)
    }
}

/// The fields we read back from a freshly created comment
#[derive(Debug, Deserialize)]
struct CreatedComment {
    id: u64,
}

#[derive(Debug, Serialize)]
struct IssueCommentBody<'a> {
    body: &'a str,
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        debug!("Fetching PR {}/{}#{}", owner, repo, pr_number);

        let pr = self
            .octocrab
            .pulls(owner, repo)
            .get(pr_number)
            .await
            .map_err(ApiError::from)?;

        Ok(PullRequest { number: pr.number })
    }

    async fn fetch_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<PullRequestFile>> {
        let route = format!("/repos/{}/{}/pulls/{}/files", owner, repo, pr_number);
        let files: Vec<PullRequestFile> = self.get_all_pages(&route).await?;

        debug!(
            "Fetched {} files for {}/{}#{}",
            files.len(),
            owner,
            repo,
            pr_number
        );
        Ok(files)
    }

    async fn fetch_review_comments(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ReviewComment>> {
        let route = format!("/repos/{}/{}/pulls/{}/comments", owner, repo, pr_number);
        let comments: Vec<ReviewComment> = self.get_all_pages(&route).await?;

        debug!(
            "Fetched {} review comments for {}/{}#{}",
            comments.len(),
            owner,
            repo,
            pr_number
        );
        Ok(comments)
    }

    async fn create_review_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        comment: &NewReviewComment,
    ) -> anyhow::Result<u64> {
        let route = format!("/repos/{}/{}/pulls/{}/comments", owner, repo, pr_number);
        let created: CreatedComment = self
            .octocrab
            .post(route, Some(comment))
            .await
            .map_err(ApiError::from)?;

        debug!(
            "Created review comment {} on {}:{}",
            created.id, comment.path, comment.line
        );
        Ok(created.id)
    }

    async fn delete_review_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
    ) -> anyhow::Result<()> {
        let route = format!("/repos/{}/{}/pulls/comments/{}", owner, repo, comment_id);

        // DELETE answers 204 without a body, so skip response deserialization
        let deleted = match self.octocrab._delete(route, None::<&()>).await {
            Ok(response) => octocrab::map_github_error(response).await.map(drop),
            Err(err) => Err(err),
        };
        absorb_missing(deleted.map_err(ApiError::from), comment_id)?;

        debug!("Deleted review comment {}", comment_id);
        Ok(())
    }

    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> anyhow::Result<u64> {
        let route = format!("/repos/{}/{}/issues/{}/comments", owner, repo, pr_number);
        let created: CreatedComment = self
            .octocrab
            .post(route, Some(&IssueCommentBody { body }))
            .await
            .map_err(ApiError::from)?;

        debug!("Created issue comment {} on #{}", created.id, pr_number);
        Ok(created.id)
    }
}

/// A review comment that is already gone counts as deleted
fn absorb_missing(result: Result<(), ApiError>, comment_id: u64) -> Result<(), ApiError> {
    match result {
        Err(err) if err.status == Some(STATUS_NOT_FOUND) => {
            warn!("Review comment {} was already deleted", comment_id);
            Ok(())
        }
        other => other,
    }
}
