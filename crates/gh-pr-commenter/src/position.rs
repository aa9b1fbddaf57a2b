//! Mapping absolute file lines to diff positions

use crate::error::CommentError;
use crate::patch::ChangeRange;
use std::collections::HashMap;

impl ChangeRange {
    /// Whether `line` lies inside the commentable range
    pub fn contains(&self, line: u32) -> bool {
        self.range_start() <= line && line <= self.range_end()
    }

    /// Diff position of `line`: the hunk header is position 0, the first
    /// line of the hunk position 1
    pub fn position(&self, line: u32) -> Option<u32> {
        self.contains(line).then(|| line - self.range_start() + 1)
    }
}

/// Commentable ranges of a pull request, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    ranges: HashMap<String, ChangeRange>,
}

impl ChangeSet {
    pub fn new(ranges: impl IntoIterator<Item = ChangeRange>) -> Self {
        let ranges = ranges
            .into_iter()
            .map(|range| (range.file_name().to_string(), range))
            .collect();
        Self { ranges }
    }

    /// Range of `file` if `line` may receive a comment
    ///
    /// Fails for unknown files and lines outside the first hunk.
    pub fn resolve(&self, file: &str, line: u32) -> Result<&ChangeRange, CommentError> {
        self.ranges
            .get(file)
            .filter(|range| range.contains(line))
            .ok_or_else(|| CommentError::InvalidTarget {
                file: file.to_string(),
                line,
            })
    }

    pub fn get(&self, file: &str) -> Option<&ChangeRange> {
        self.ranges.get(file)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeRange> {
        self.ranges.values()
    }

    /// Files with more than one hunk, sorted by name
    pub fn truncated_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self
            .iter()
            .filter(|range| range.is_truncated())
            .map(ChangeRange::file_name)
            .collect();
        files.sort_unstable();
        files
    }
}
