//! Post review comments onto a pull request's changed lines
//!
//! Linters and other analysis tools that run on every CI build of a pull
//! request use this crate to report findings as review comments. A
//! [`Commenter`] session:
//!
//! - parses each changed file's patch into the line range that can take a
//!   comment ([`patch`]),
//! - maps an absolute file line to the diff position GitHub expects
//!   ([`position`]),
//! - replaces an earlier comment with the same file and body instead of
//!   posting a duplicate ([`reconcile`]),
//! - retries writes that hit GitHub's abuse rate limit ([`retry`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_pr_commenter::Commenter;
//! use gh_pr_config::CommenterConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CommenterConfig::load().with_target("octo", "hello", 42);
//! let commenter = Commenter::from_config(&config).await?;
//!
//! commenter
//!     .write_line_comment("src/main.rs", "unused variable `x`", 12)
//!     .await?;
//! commenter.write_general_comment("lint finished: 1 finding").await?;
//! # Ok(())
//! # }
//! ```

pub mod commenter;
pub mod error;
pub mod patch;
pub mod position;
pub mod reconcile;
pub mod retry;

#[cfg(test)]
mod testing;

pub use commenter::{Commenter, PullRequestTarget};
pub use error::{CommentError, PatchError, SetupError};
pub use patch::{parse_change_set, ChangeRange};
pub use position::ChangeSet;
pub use reconcile::CommentIndex;
pub use retry::{is_rate_limited, RetryError, RetryScheduler};
