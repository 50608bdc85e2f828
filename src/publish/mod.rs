//! Comment publisher.
//!
//! Posts the parsed review back to the pull request:
//! - one summary comment per run, skipped when a prior bot summary is
//!   already present (hidden marker substring + optional author check);
//! - one inline comment per reported issue, snapped to the nearest valid
//!   new-file line when the model's claimed line is not commentable.
//!
//! Per-comment posting failures are counted and logged, never fatal; the
//! loop posts strictly sequentially in model order.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ReviewConfig;
use crate::errors::ReviewResult;
use crate::github::{GitHubClient, IssueComment, PullRequestMeta};
use crate::patch::snap_to_valid_line;
use crate::review::{ReviewComment, ReviewFeedback};

/// Hidden marker embedded in the summary body to detect reruns.
const SUMMARY_MARKER: &str = "<!-- pr-reviewer:summary -->";

/// Outcome of one publish pass.
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Was a new summary comment created (false on duplicate or failure)?
    pub summary_posted: bool,
    pub inline_posted: usize,
    pub inline_failed: usize,
}

/// Publishes summary + inline comments for the run.
pub async fn publish_review(
    cfg: &ReviewConfig,
    client: &GitHubClient,
    meta: &PullRequestMeta,
    feedback: &ReviewFeedback,
    valid_lines: &HashMap<String, Vec<u32>>,
) -> ReviewResult<PublishReport> {
    let mut report = PublishReport::default();

    // Idempotence guard: one summary per PR, across reruns.
    let existing = client.list_issue_comments(meta.number).await?;
    if has_existing_summary(&existing, cfg.bot_login.as_deref()) {
        info!("summary already present, skipping summary post");
    } else {
        let body = render_summary_body(&meta.author_login, &feedback.summary);
        match client.post_issue_comment(meta.number, &body).await {
            Ok(()) => {
                info!("posted summary comment");
                report.summary_posted = true;
            }
            Err(e) => warn!("failed to post summary: {}", e),
        }
    }

    for comment in &feedback.comments {
        let Some(valid) = valid_lines.get(&comment.file) else {
            warn!(
                "no valid lines known for {}, skipping comment",
                comment.file
            );
            report.inline_failed += 1;
            continue;
        };
        let Some(line) = snap_to_valid_line(valid, comment.line) else {
            warn!(
                "{} has an empty valid-line set, skipping comment",
                comment.file
            );
            report.inline_failed += 1;
            continue;
        };
        if line != comment.line {
            debug!(
                "snapped {}:{} to line {}",
                comment.file, comment.line, line
            );
        }

        let body = render_inline_body(comment, line);
        match client
            .post_review_comment(meta.number, &meta.head_sha, &comment.file, line, &body)
            .await
        {
            Ok(()) => {
                debug!("commented on {}:{}", comment.file, line);
                report.inline_posted += 1;
            }
            Err(e) => {
                // Stale line references or permission errors affect only
                // this comment; the loop continues.
                warn!("failed to comment on {}:{}: {}", comment.file, line, e);
                report.inline_failed += 1;
            }
        }
    }

    info!(
        summary_posted = report.summary_posted,
        inline_posted = report.inline_posted,
        inline_failed = report.inline_failed,
        "publish done"
    );
    Ok(report)
}

/// True when a prior bot summary exists: marker substring in the body and,
/// when a bot login is configured, a matching author.
pub fn has_existing_summary(comments: &[IssueComment], bot_login: Option<&str>) -> bool {
    comments.iter().any(|c| {
        let marked = c
            .body
            .as_deref()
            .is_some_and(|b| b.contains(SUMMARY_MARKER));
        let author_ok = match bot_login {
            Some(login) => c.author_login.as_deref() == Some(login),
            None => true,
        };
        marked && author_ok
    })
}

/// Markdown body for the summary comment, addressing the PR author.
fn render_summary_body(author_login: &str, summary: &str) -> String {
    format!(
        "**AI Code Review Summary**\n\nHi @{author_login}, here's an automated review of your pull request:\n\n---\n\n{summary}\n\n---\n> **Note:** This is an AI-generated review. Please verify suggestions before applying.\n\n{SUMMARY_MARKER}"
    )
}

/// Markdown body for one inline comment; renders the suggestion as a code
/// fence when present and prefixes the severity tag when present.
fn render_inline_body(comment: &ReviewComment, line: u32) -> String {
    let mut body = String::from("**AI Suggestion**");
    if let Some(sev) = comment.severity {
        body.push_str(&format!(" `{}`", sev.label()));
    }
    body.push_str(&format!("\n**Line {line}**:\n{}\n", comment.comment));
    if let Some(suggestion) = comment.suggestion.as_deref().filter(|s| !s.trim().is_empty()) {
        body.push_str(&format!("\n```suggestion\n{}\n```\n", suggestion.trim_end()));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Severity;

    fn comment(body: Option<&str>, author: Option<&str>) -> IssueComment {
        IssueComment {
            body: body.map(|s| s.to_string()),
            author_login: author.map(|s| s.to_string()),
        }
    }

    #[test]
    fn marker_alone_detects_summary_without_login_check() {
        let comments = vec![
            comment(Some("unrelated"), Some("alice")),
            comment(
                Some("review body\n<!-- pr-reviewer:summary -->"),
                Some("review-bot"),
            ),
        ];
        assert!(has_existing_summary(&comments, None));
    }

    #[test]
    fn login_check_rejects_foreign_marker() {
        // Someone quoted the marker in their own comment; with a bot login
        // configured, that must not count as our summary.
        let comments = vec![comment(
            Some("look: <!-- pr-reviewer:summary -->"),
            Some("alice"),
        )];
        assert!(!has_existing_summary(&comments, Some("review-bot")));
        assert!(has_existing_summary(&comments, Some("alice")));
    }

    #[test]
    fn no_marker_means_no_summary() {
        let comments = vec![comment(Some("plain comment"), Some("review-bot"))];
        assert!(!has_existing_summary(&comments, None));
        assert!(!has_existing_summary(&[], None));
    }

    #[test]
    fn summary_body_carries_marker_and_author() {
        let body = render_summary_body("octocat", "Looks solid overall.");
        assert!(body.contains("@octocat"));
        assert!(body.contains("Looks solid overall."));
        assert!(body.contains(SUMMARY_MARKER));
    }

    #[test]
    fn inline_body_renders_suggestion_fence() {
        let c = ReviewComment {
            file: "src/lib.rs".into(),
            line: 12,
            comment: "Avoid unwrap here.".into(),
            suggestion: Some("let v = x?;".into()),
            severity: Some(Severity::Major),
        };
        let body = render_inline_body(&c, 10);
        assert!(body.contains("**Line 10**"));
        assert!(body.contains("`major`"));
        assert!(body.contains("```suggestion\nlet v = x?;\n```"));
    }

    #[test]
    fn inline_body_without_optionals() {
        let c = ReviewComment {
            file: "src/lib.rs".into(),
            line: 4,
            comment: "Name is unclear.".into(),
            suggestion: None,
            severity: None,
        };
        let body = render_inline_body(&c, 4);
        assert!(body.contains("**Line 4**"));
        assert!(!body.contains("```suggestion"));
        assert!(!body.contains('`'));
    }
}
