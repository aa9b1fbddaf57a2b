//! Matching new comments against previously posted ones
//!
//! A comment matches when both its file and its body are byte-for-byte
//! equal. When several existing comments match, the last one listed wins.

use gh_client::ReviewComment;
use log::{debug, warn};
use std::collections::HashMap;

/// Existing review comment ids keyed by file, then body
#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    by_file: HashMap<String, HashMap<String, u64>>,
}

impl CommentIndex {
    pub fn new(comments: &[ReviewComment]) -> Self {
        let mut index = Self::default();
        for comment in comments {
            if let Some(previous) = index.insert(&comment.path, &comment.body, comment.id) {
                warn!(
                    "Duplicate review comment on {}: {} and {} share a body, using {}",
                    comment.path, previous, comment.id, comment.id
                );
            }
        }
        debug!("Indexed {} existing review comments", comments.len());
        index
    }

    /// Id of the existing comment to replace, if any
    pub fn find(&self, file: &str, body: &str) -> Option<u64> {
        self.by_file.get(file)?.get(body).copied()
    }

    /// Record a comment, returning the id it displaced
    pub fn insert(&mut self, file: &str, body: &str, id: u64) -> Option<u64> {
        self.by_file
            .entry(file.to_string())
            .or_default()
            .insert(body.to_string(), id)
    }

    /// Forget a comment, but only if `id` is still the one recorded
    pub fn remove(&mut self, file: &str, body: &str, id: u64) {
        if let Some(bodies) = self.by_file.get_mut(file) {
            if bodies.get(body) == Some(&id) {
                bodies.remove(body);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_file.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
