//! In-memory `GitHubClient` for tests

use async_trait::async_trait;
use gh_client::{
    ApiError, FileStatus, GitHubClient, NewReviewComment, PullRequest, PullRequestFile,
    ReviewComment,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const HEAD_SHA: &str = "6dcb09b5b57875f334f61aebed695e2e4193db5e";

/// A remote call the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchPullRequest(u64),
    FetchFiles(u64),
    FetchComments(u64),
    CreateReviewComment(NewReviewComment),
    DeleteReviewComment(u64),
    CreateIssueComment(String),
}

/// Mock client for testing
///
/// Create and delete calls answer from their scripted queues first and
/// succeed once a queue is empty.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    pub pr_missing: bool,
    pub files: Vec<PullRequestFile>,
    pub comments: Vec<ReviewComment>,
    pub files_error: Option<ApiError>,
    pub comments_error: Option<ApiError>,
    calls: Arc<Mutex<Vec<Call>>>,
    create_results: Arc<Mutex<VecDeque<Result<u64, ApiError>>>>,
    delete_results: Arc<Mutex<VecDeque<Result<(), ApiError>>>>,
    next_id: Arc<Mutex<u64>>,
}

impl MockClient {
    pub fn new(files: Vec<PullRequestFile>, comments: Vec<ReviewComment>) -> Self {
        Self {
            files,
            comments,
            next_id: Arc::new(Mutex::new(1000)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls after session setup (creates and deletes only)
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                !matches!(
                    call,
                    Call::FetchPullRequest(_) | Call::FetchFiles(_) | Call::FetchComments(_)
                )
            })
            .collect()
    }

    pub fn script_create(&self, result: Result<u64, ApiError>) {
        self.create_results.lock().unwrap().push_back(result);
    }

    pub fn script_delete(&self, result: Result<(), ApiError>) {
        self.delete_results.lock().unwrap().push_back(result);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_created(&self) -> anyhow::Result<u64> {
        match self.create_results.lock().unwrap().pop_front() {
            Some(result) => Ok(result?),
            None => {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                Ok(*next_id)
            }
        }
    }
}

#[async_trait]
impl GitHubClient for MockClient {
    async fn fetch_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        self.record(Call::FetchPullRequest(pr_number));
        if self.pr_missing {
            return Err(ApiError::with_status(404, "Not Found").into());
        }
        Ok(PullRequest { number: pr_number })
    }

    async fn fetch_pull_request_files(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<PullRequestFile>> {
        self.record(Call::FetchFiles(pr_number));
        match &self.files_error {
            Some(err) => Err(err.clone().into()),
            None => Ok(self.files.clone()),
        }
    }

    async fn fetch_review_comments(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ReviewComment>> {
        self.record(Call::FetchComments(pr_number));
        match &self.comments_error {
            Some(err) => Err(err.clone().into()),
            None => Ok(self.comments.clone()),
        }
    }

    async fn create_review_comment(
        &self,
        _owner: &str,
        _repo: &str,
        _pr_number: u64,
        comment: &NewReviewComment,
    ) -> anyhow::Result<u64> {
        self.record(Call::CreateReviewComment(comment.clone()));
        self.next_created()
    }

    async fn delete_review_comment(
        &self,
        _owner: &str,
        _repo: &str,
        comment_id: u64,
    ) -> anyhow::Result<()> {
        self.record(Call::DeleteReviewComment(comment_id));
        match self.delete_results.lock().unwrap().pop_front() {
            Some(result) => Ok(result?),
            None => Ok(()),
        }
    }

    async fn create_issue_comment(
        &self,
        _owner: &str,
        _repo: &str,
        _pr_number: u64,
        body: &str,
    ) -> anyhow::Result<u64> {
        self.record(Call::CreateIssueComment(body.to_string()));
        self.next_created()
    }
}

pub fn pr_file(name: &str, patch: Option<&str>, changes: u64) -> PullRequestFile {
    PullRequestFile {
        filename: name.to_string(),
        status: FileStatus::Modified,
        patch: patch.map(str::to_string),
        changes,
        contents_url: format!(
            "https://api.github.com/repos/octo/hello/contents/{}?ref={}",
            name, HEAD_SHA
        ),
    }
}

pub fn review_comment(id: u64, path: &str, body: &str) -> ReviewComment {
    ReviewComment {
        id,
        path: path.to_string(),
        body: body.to_string(),
    }
}

pub fn rate_limited() -> ApiError {
    ApiError::with_status(422, "You have exceeded a secondary rate limit")
}
