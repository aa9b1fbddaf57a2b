//! Per-file patch parsing
//!
//! GitHub returns one unified diff fragment per changed file. Only the first
//! hunk header is used to derive the commentable line range; files with more
//! hunks are flagged as truncated so callers can tell.

use crate::error::{PatchError, SetupError};
use gh_client::PullRequestFile;
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

fn hunk_header_regex() -> &'static Regex {
    static HUNK_HEADER: OnceLock<Regex> = OnceLock::new();
    // Match the post-change side of `@@ -a,b +start,count @@`
    HUNK_HEADER.get_or_init(|| Regex::new(r"(?m)^@@.*\+(\d+),(\d+).+?@@").unwrap())
}

fn commit_ref_regex() -> &'static Regex {
    static COMMIT_REF: OnceLock<Regex> = OnceLock::new();
    COMMIT_REF.get_or_init(|| Regex::new(r".+ref=(.+)").unwrap())
}

/// The commentable line range of one pull request file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRange {
    file_name: String,
    range_start: u32,
    range_end: u32,
    commit_ref: String,
    hunk_count: usize,
}

impl ChangeRange {
    /// Parse a file's patch fragment and contents URL
    ///
    /// # Arguments
    ///
    /// * `file_name` - Path of the file in the pull request
    /// * `patch` - Unified diff fragment, if GitHub returned one
    /// * `changes` - Number of changed lines GitHub reports for the file
    /// * `contents_url` - Contents API URL ending in `ref=<sha>`
    pub fn parse(
        file_name: &str,
        patch: Option<&str>,
        changes: u64,
        contents_url: &str,
    ) -> Result<Self, PatchError> {
        let patch = patch.unwrap_or_default();
        let mut hunks = hunk_header_regex().captures_iter(patch);

        let first_hunk = hunks.next().and_then(|caps| {
            let start = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let count = caps.get(2)?.as_str().parse::<u32>().ok()?;
            // An empty post-change side has no line to comment on
            let end = start.checked_add(count.checked_sub(1)?)?;
            Some((start, end))
        });
        let hunk_count = usize::from(first_hunk.is_some()) + hunks.count();

        let (range_start, range_end) = match first_hunk {
            Some(range) => range,
            None if changes >= 1 => (1, 1),
            None => {
                return Err(PatchError::PatchUnresolved {
                    file: file_name.to_string(),
                })
            }
        };

        let commit_ref = commit_ref_regex()
            .captures(contents_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| PatchError::RefUnresolved {
                file: file_name.to_string(),
                contents_url: contents_url.to_string(),
            })?;

        Ok(Self {
            file_name: file_name.to_string(),
            range_start,
            range_end,
            commit_ref,
            hunk_count,
        })
    }

    /// Parse a file entry as returned by the pull request files endpoint
    pub fn from_file(file: &PullRequestFile) -> Result<Self, PatchError> {
        Self::parse(
            &file.filename,
            file.patch.as_deref(),
            file.changes,
            &file.contents_url,
        )
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// First commentable line (inclusive)
    pub fn range_start(&self) -> u32 {
        self.range_start
    }

    /// Last commentable line (inclusive)
    pub fn range_end(&self) -> u32 {
        self.range_end
    }

    /// Commit the comments on this file must be anchored to
    pub fn commit_ref(&self) -> &str {
        &self.commit_ref
    }

    /// Number of hunk headers found in the patch
    pub fn hunk_count(&self) -> usize {
        self.hunk_count
    }

    /// True when the patch had hunks beyond the first, which are not commentable
    pub fn is_truncated(&self) -> bool {
        self.hunk_count > 1
    }
}

/// Parse every non-deleted file of a pull request
///
/// All failures are collected; the batch fails if any single file failed.
pub fn parse_change_set(files: &[PullRequestFile]) -> Result<Vec<ChangeRange>, SetupError> {
    let mut ranges = Vec::new();
    let mut errors = Vec::new();

    for file in files {
        if file.is_removed() {
            debug!("Skipping deleted file {}", file.filename);
            continue;
        }

        match ChangeRange::from_file(file) {
            Ok(range) => {
                if range.is_truncated() {
                    warn!(
                        "{} has {} hunks, only lines {}..={} of the first hunk can be commented",
                        range.file_name(),
                        range.hunk_count(),
                        range.range_start(),
                        range.range_end()
                    );
                }
                ranges.push(range);
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(SetupError::ChangeSet(errors));
    }

    debug!("Resolved commentable ranges for {} files", ranges.len());
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_client::FileStatus;
    use pretty_assertions::assert_eq;

    const CONTENTS_URL: &str = concat!(
        "https://api.github.com/repos/octo/hello/contents/a.go",
        "?ref=6dcb09b5b57875f334f61aebed695e2e4193db5e"
    );

    fn parse(name: &str, patch: Option<&str>, changes: u64) -> Result<ChangeRange, PatchError> {
        ChangeRange::parse(name, patch, changes, CONTENTS_URL)
    }

    fn file(name: &str, status: FileStatus, patch: Option<&str>, changes: u64) -> PullRequestFile {
        PullRequestFile {
            filename: name.to_string(),
            status,
            patch: patch.map(str::to_string),
            changes,
            contents_url: CONTENTS_URL.to_string(),
        }
    }

    #[test]
    fn test_hunk_header_defines_range() {
        let range = parse("a.go", Some("@@ -1,3 +10,5 @@"), 5).unwrap();

        assert_eq!(range.file_name(), "a.go");
        assert_eq!(range.range_start(), 10);
        assert_eq!(range.range_end(), 14);
        assert_eq!(range.commit_ref(), "6dcb09b5b57875f334f61aebed695e2e4193db5e");
        assert_eq!(range.hunk_count(), 1);
        assert!(!range.is_truncated());
    }

    #[test]
    fn test_hunk_header_with_section_and_body() {
        let patch = concat!(
            "@@ -12,7 +12,8 @@ impl Foo {\n",
            " fn bar() {\n-    old();\n+    new();\n+    newer();\n }"
        );
        let range = parse("src/lib.rs", Some(patch), 3).unwrap();

        assert_eq!((range.range_start(), range.range_end()), (12, 19));
    }

    #[test]
    fn test_single_line_hunk() {
        let range = parse("a.go", Some("@@ -0,0 +1,1 @@\n+x"), 1).unwrap();
        assert_eq!((range.range_start(), range.range_end()), (1, 1));
    }

    #[test]
    fn test_no_hunk_with_changes_degenerates_to_first_line() {
        let range = parse("renamed.go", None, 1).unwrap();
        assert_eq!((range.range_start(), range.range_end()), (1, 1));
    }

    #[test]
    fn test_no_hunk_and_no_changes_fails() {
        let err = parse("renamed.go", None, 0).unwrap_err();
        assert_eq!(
            err,
            PatchError::PatchUnresolved {
                file: "renamed.go".to_string()
            }
        );
    }

    #[test]
    fn test_empty_post_change_side_is_not_a_range() {
        let err = parse("a.go", Some("@@ -3,2 +2,0 @@"), 0).unwrap_err();
        assert!(matches!(err, PatchError::PatchUnresolved { .. }));

        let range = parse("a.go", Some("@@ -3,2 +2,0 @@"), 2).unwrap();
        assert_eq!((range.range_start(), range.range_end()), (1, 1));
    }

    #[test]
    fn test_missing_ref_fails() {
        let err = ChangeRange::parse(
            "a.go",
            Some("@@ -1,3 +10,5 @@"),
            5,
            "https://api.github.com/repos/octo/hello/contents/a.go",
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::RefUnresolved { ref file, .. } if file == "a.go"));
    }

    #[test]
    fn test_only_first_hunk_is_used() {
        let patch = "@@ -1,3 +1,4 @@\n a\n+b\n c\n d\n@@ -40,2 +41,6 @@ fn tail()\n x\n+y";
        let range = parse("a.go", Some(patch), 2).unwrap();

        assert_eq!((range.range_start(), range.range_end()), (1, 4));
        assert_eq!(range.hunk_count(), 2);
        assert!(range.is_truncated());
    }

    #[test]
    fn test_parse_change_set_skips_deleted_files() {
        let files = vec![
            file("a.go", FileStatus::Modified, Some("@@ -1,3 +10,5 @@"), 5),
            file("gone.go", FileStatus::Removed, None, 0),
        ];

        let ranges = parse_change_set(&files).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].file_name(), "a.go");
    }

    #[test]
    fn test_parse_change_set_aggregates_all_failures() {
        let mut no_ref = file("b.go", FileStatus::Added, Some("@@ -0,0 +1,2 @@"), 2);
        no_ref.contents_url = "https://example.com/b.go".to_string();
        let files = vec![
            file("a.go", FileStatus::Modified, Some("@@ -1,3 +10,5 @@"), 5),
            file("empty.go", FileStatus::Renamed, None, 0),
            no_ref,
        ];

        match parse_change_set(&files) {
            Err(SetupError::ChangeSet(errors)) => {
                let failed: Vec<&str> = errors.iter().map(PatchError::file).collect();
                assert_eq!(failed, vec!["empty.go", "b.go"]);
            }
            other => panic!("expected aggregated change set error, got {other:?}"),
        }
    }
}
