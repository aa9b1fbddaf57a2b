//! GitHub API client for posting pull request review comments
//!
//! This crate provides a trait-based GitHub API client. The commenter core
//! depends only on the `GitHubClient` trait; `OctocrabClient` is the
//! implementation that talks to the real API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              GitHubClient trait                  │
//! │  - fetch_pull_request_files()                    │
//! │  - fetch_review_comments()                       │
//! │  - create_review_comment() / delete...()         │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              ┌─────────────────┐
//!              │ OctocrabClient  │
//!              │ (direct API)    │
//!              └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{GitHubClient, TokenResolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let token = TokenResolver::new().get_token(None).await?;
//! let client = gh_client::build_client(gh_client::DEFAULT_HOST, token)?;
//!
//! let files = client.fetch_pull_request_files("owner", "repo", 42).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod octocrab_client;
pub mod types;

/// Default GitHub host (public GitHub)
pub use gh_pr_config::DEFAULT_HOST;

pub use auth::{build_client, TokenResolver};
pub use client::GitHubClient;
pub use error::{status_of, ApiError, STATUS_NOT_FOUND, STATUS_UNPROCESSABLE};
pub use octocrab_client::OctocrabClient;
pub use types::{
    FileStatus, NewReviewComment, PullRequest, PullRequestFile, ReviewComment, SIDE_RIGHT,
};
