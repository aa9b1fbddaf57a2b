//! Commenting session bound to one pull request
//!
//! A [`Commenter`] loads the pull request's changed files and existing
//! review comments once, then writes comments only at commentable lines,
//! replacing an identical earlier comment instead of duplicating it.

use crate::error::{CommentError, SetupError};
use crate::patch::{parse_change_set, ChangeRange};
use crate::position::ChangeSet;
use crate::reconcile::CommentIndex;
use crate::retry::RetryScheduler;
use gh_client::{GitHubClient, NewReviewComment, TokenResolver};
use gh_pr_config::CommenterConfig;
use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The pull request a session writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestTarget {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

impl PullRequestTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, pr_number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            pr_number,
        }
    }
}

impl From<&CommenterConfig> for PullRequestTarget {
    fn from(config: &CommenterConfig) -> Self {
        Self::new(&config.owner, &config.repo, config.pr_number)
    }
}

/// Writes review comments to one pull request
pub struct Commenter {
    client: Arc<dyn GitHubClient>,
    target: PullRequestTarget,
    changes: ChangeSet,
    // Updated after every write so repeated writes in one session replace
    // the comment this session created
    comments: Mutex<CommentIndex>,
    retry: RetryScheduler,
}

impl std::fmt::Debug for Commenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commenter")
            .field("target", &self.target)
            .field("changes", &self.changes)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Commenter {
    /// Create a session from a config file's settings
    ///
    /// Resolves a token for the configured host, builds an octocrab client
    /// and loads the pull request state.
    pub async fn from_config(config: &CommenterConfig) -> Result<Self, SetupError> {
        config.validate().map_err(SetupError::InvalidConfig)?;

        let token = TokenResolver::new()
            .get_token(Some(&config.host))
            .await
            .map_err(SetupError::MissingToken)?;
        let client = gh_client::build_client(&config.host, token).map_err(SetupError::Client)?;

        Self::connect(
            Arc::new(client),
            PullRequestTarget::from(config),
            RetryScheduler::from(config.retry),
        )
        .await
    }

    /// Check the pull request exists and load its files and review comments
    pub async fn connect(
        client: Arc<dyn GitHubClient>,
        target: PullRequestTarget,
        retry: RetryScheduler,
    ) -> Result<Self, SetupError> {
        let PullRequestTarget {
            owner,
            repo,
            pr_number,
        } = &target;

        client
            .fetch_pull_request(owner, repo, *pr_number)
            .await
            .map_err(|source| SetupError::PullRequestNotFound {
                owner: owner.clone(),
                repo: repo.clone(),
                pr_number: *pr_number,
                source,
            })?;

        let files = client
            .fetch_pull_request_files(owner, repo, *pr_number)
            .await
            .map_err(|source| SetupError::Fetch {
                what: "pull request files",
                source,
            })?;
        let ranges = parse_change_set(&files)?;

        let existing = client
            .fetch_review_comments(owner, repo, *pr_number)
            .await
            .map_err(|source| SetupError::Fetch {
                what: "review comments",
                source,
            })?;

        info!(
            "Connected to {}/{}#{}: {} commentable files, {} existing review comments",
            owner,
            repo,
            pr_number,
            ranges.len(),
            existing.len()
        );

        Ok(Self::new(
            client,
            target,
            ChangeSet::new(ranges),
            CommentIndex::new(&existing),
            retry,
        ))
    }

    /// Create a session from already fetched pull request state
    pub fn new(
        client: Arc<dyn GitHubClient>,
        target: PullRequestTarget,
        changes: ChangeSet,
        comments: CommentIndex,
        retry: RetryScheduler,
    ) -> Self {
        Self {
            client,
            target,
            changes,
            comments: Mutex::new(comments),
            retry,
        }
    }

    pub fn target(&self) -> &PullRequestTarget {
        &self.target
    }

    pub fn change_set(&self) -> &ChangeSet {
        &self.changes
    }

    /// Files with hunks beyond the first, whose later hunks cannot be commented
    pub fn truncated_files(&self) -> Vec<&str> {
        self.changes.truncated_files()
    }

    /// Write a review comment on a single line of a file
    pub async fn write_line_comment(
        &self,
        file: &str,
        body: &str,
        line: u32,
    ) -> Result<(), CommentError> {
        let range = self.changes.resolve(file, line)?;
        let comment = build_comment(range, body, line)?;
        self.write_comment_if_required(comment).await
    }

    /// Write a review comment spanning `start_line..=end_line` of a file
    ///
    /// A span of one line is written as a single-line comment.
    pub async fn write_multi_line_comment(
        &self,
        file: &str,
        body: &str,
        start_line: u32,
        end_line: u32,
    ) -> Result<(), CommentError> {
        self.changes.resolve(file, start_line)?;
        let range = self.changes.resolve(file, end_line)?;

        if start_line == end_line {
            return self.write_line_comment(file, body, end_line).await;
        }
        if start_line > end_line {
            return Err(CommentError::InvalidSpan {
                file: file.to_string(),
                start_line,
                end_line,
            });
        }

        let comment = build_comment(range, body, end_line)?.with_start_line(start_line);
        self.write_comment_if_required(comment).await
    }

    /// Write a comment on the pull request conversation, not anchored to a line
    pub async fn write_general_comment(&self, body: &str) -> Result<(), CommentError> {
        let client = self.client.as_ref();
        let target = &self.target;

        let id = self
            .retry
            .run("issue comment", move || {
                client.create_issue_comment(
                    &target.owner,
                    &target.repo,
                    target.pr_number,
                    body,
                )
            })
            .await?;

        info!("Created comment {} on #{}", id, target.pr_number);
        Ok(())
    }

    /// Create `comment`, first deleting an identical one if it exists
    async fn write_comment_if_required(
        &self,
        comment: NewReviewComment,
    ) -> Result<(), CommentError> {
        let existing = self.index().find(&comment.path, &comment.body);

        if let Some(comment_id) = existing {
            debug!(
                "Replacing existing comment {} on {}",
                comment_id, comment.path
            );
            self.delete_comment(comment_id).await?;
            self.index().remove(&comment.path, &comment.body, comment_id);
        }

        let client = self.client.as_ref();
        let target = &self.target;
        let payload = &comment;

        let created = self
            .retry
            .run("review comment", move || {
                client.create_review_comment(
                    &target.owner,
                    &target.repo,
                    target.pr_number,
                    payload,
                )
            })
            .await;

        match (created, existing) {
            (Ok(id), _) => {
                self.index().insert(&comment.path, &comment.body, id);
                info!(
                    "Created review comment {} on {}:{}",
                    id, comment.path, comment.line
                );
                Ok(())
            }
            (Err(err), Some(deleted_id)) => Err(CommentError::ReplaceIncomplete {
                deleted_id,
                source: Box::new(err.into()),
            }),
            (Err(err), None) => Err(err.into()),
        }
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<(), CommentError> {
        self.client
            .delete_review_comment(&self.target.owner, &self.target.repo, comment_id)
            .await
            .map_err(|source| CommentError::DeleteFailed { comment_id, source })
    }

    fn index(&self) -> MutexGuard<'_, CommentIndex> {
        self.comments.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_comment(
    range: &ChangeRange,
    body: &str,
    line: u32,
) -> Result<NewReviewComment, CommentError> {
    let position = range
        .position(line)
        .ok_or_else(|| CommentError::InvalidTarget {
            file: range.file_name().to_string(),
            line,
        })?;

    Ok(NewReviewComment::single_line(
        range.file_name(),
        body,
        range.commit_ref(),
        line,
        position,
    ))
}
