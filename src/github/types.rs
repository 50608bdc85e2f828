//! Normalized data model for the pull request under review.
//!
//! These types are the output of the fetch stage and are consumed by the
//! prompt builder and the publisher. Provider response shapes stay private
//! to the client; only what later stages need is kept here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// High-level pull request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestMeta {
    pub number: u64,
    pub title: String,
    pub state: String,
    /// Login of the human who opened the PR (used to address the summary).
    pub author_login: String,
    /// Commit SHA inline comments are anchored to.
    pub head_sha: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One changed file as reported by the files endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    /// "added" | "modified" | "removed" | "renamed" | ...
    pub status: String,
    pub additions: u32,
    pub deletions: u32,
    /// Unified-diff hunks for this file. Absent for binary or very large
    /// files; such files cannot receive inline comments.
    pub patch: Option<String>,
}

/// An existing PR conversation comment (for the duplicate-summary check).
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub body: Option<String>,
    pub author_login: Option<String>,
}
