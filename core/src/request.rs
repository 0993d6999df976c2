//! Change-request input records. Immutable for the duration of one
//! assignment cycle.

use crate::types::{ChangeKind, PersonId, Priority, RequestId, SizeClass};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: RequestId,
    pub author: PersonId,
    pub repository: String,
    pub files: Vec<FileDelta>,
    pub size: SizeClass,
    pub priority: Priority,
    pub labels: Vec<String>,
    /// Reviewers the caller insists on; carried through for callers, not a
    /// ranking input.
    pub required_reviewers: Vec<PersonId>,
    /// Reviewers that must never appear in output.
    pub excluded_reviewers: Vec<PersonId>,
    pub draft: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDelta {
    pub path: String,
    pub kind: ChangeKind,
    pub lines_added: u32,
    pub lines_removed: u32,
    /// Language inferred by the code-hosting integration, if it knows.
    pub language: Option<String>,
    /// Complexity score, clamped to 1..=10 at construction.
    pub complexity: u8,
}

impl FileDelta {
    pub fn new(path: impl Into<String>, kind: ChangeKind, complexity: u8) -> Self {
        Self {
            path: path.into(),
            kind,
            lines_added: 0,
            lines_removed: 0,
            language: None,
            complexity: complexity.clamp(1, 10),
        }
    }

    /// Lowercased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.path.rsplit('/').next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            // Dotfiles like ".gitignore" have no extension.
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl ChangeRequest {
    /// Total complexity across all files, used by the review-time estimate.
    pub fn total_complexity(&self) -> u32 {
        self.files.iter().map(|f| f.complexity as u32).sum()
    }
}
