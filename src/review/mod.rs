//! Review requester: file filtering, prompt → LLM → structured parse.
//!
//! Flow:
//!   1) keep changed files whose extension matches the configured set and
//!      which carry patch text (binary/oversized files have none);
//!   2) optionally fetch full file content at head SHA for prompt context;
//!   3) one chat completion for the whole change set;
//!   4) strip optional code fences and parse strictly into `ReviewFeedback`.

pub mod llm;
pub mod prompt;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ReviewConfig;
use crate::errors::{Error, ModelError, ReviewResult};
use crate::github::{ChangedFile, GitHubClient, PullRequestMeta};
use llm::OpenAiClient;
use prompt::{ReviewInput, SYSTEM_PROMPT, build_review_prompt};

/// Severity tag reported by the model, used only for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Style,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Style => "style",
        }
    }
}

/// One issue reported by the model, anchored to a file and line.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub file: String,
    pub line: u32,
    pub comment: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Parsed model output: one summary plus inline comments.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewFeedback {
    pub summary: String,
    #[serde(default)]
    pub comments: Vec<ReviewComment>,
}

/// Selects reviewable files and assembles prompt inputs.
///
/// Returns `Error::NoRelevantChanges` when nothing matches the extension
/// filter — callers treat that as a graceful no-op.
pub async fn collect_review_inputs(
    cfg: &ReviewConfig,
    client: &GitHubClient,
    meta: &PullRequestMeta,
    files: &[ChangedFile],
) -> ReviewResult<Vec<ReviewInput>> {
    let mut inputs = Vec::new();
    for file in files {
        if !cfg.matches_extension(&file.filename) {
            continue;
        }
        let Some(patch) = &file.patch else {
            debug!("skip {} (no patch text)", file.filename);
            continue;
        };

        let content = if cfg.include_file_context && file.status != "removed" {
            match client.get_file_content(&file.filename, &meta.head_sha).await {
                Ok(c) => c,
                Err(e) => {
                    // Context is best-effort; the patch alone still reviews.
                    warn!("could not fetch content of {}: {}", file.filename, e);
                    None
                }
            }
        } else {
            None
        };

        inputs.push(ReviewInput {
            path: file.filename.clone(),
            patch: patch.clone(),
            content,
        });
    }

    if inputs.is_empty() {
        return Err(Error::NoRelevantChanges);
    }
    Ok(inputs)
}

/// Sends the aggregated patches to the model and parses the structured
/// reply. An unparsable reply is fatal; the raw text travels with the
/// error so it can be logged for diagnosis.
pub async fn request_review(
    llm: &OpenAiClient,
    inputs: &[ReviewInput],
) -> ReviewResult<ReviewFeedback> {
    let prompt = build_review_prompt(inputs);
    info!(
        files = inputs.len(),
        prompt_len = prompt.len(),
        "requesting review from model"
    );

    let raw = llm.generate(&prompt, Some(SYSTEM_PROMPT)).await?;
    let feedback = parse_feedback(&raw)?;
    info!(
        comments = feedback.comments.len(),
        "model review parsed"
    );
    Ok(feedback)
}

/// Parses the model reply into `ReviewFeedback`, tolerating a code-fence
/// wrapper but nothing else.
pub fn parse_feedback(raw: &str) -> Result<ReviewFeedback, ModelError> {
    let clean = cleanup_json_like(raw);
    serde_json::from_str(&clean).map_err(|source| ModelError::InvalidJson {
        source,
        raw: raw.to_string(),
    })
}

/// Trim common code-fence wrappers around JSON.
fn cleanup_json_like(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let raw = r#"{"summary":"ok","comments":[{"file":"a.rs","line":3,"comment":"x"}]}"#;
        let fb = parse_feedback(raw).unwrap();
        assert_eq!(fb.summary, "ok");
        assert_eq!(fb.comments.len(), 1);
        assert_eq!(fb.comments[0].line, 3);
        assert!(fb.comments[0].suggestion.is_none());
        assert!(fb.comments[0].severity.is_none());
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"summary\":\"fine\",\"comments\":[]}\n```";
        let fb = parse_feedback(raw).unwrap();
        assert_eq!(fb.summary, "fine");
        assert!(fb.comments.is_empty());
    }

    #[test]
    fn parses_anonymous_fence() {
        let raw = "```\n{\"summary\":\"s\",\"comments\":[]}\n```";
        assert_eq!(parse_feedback(raw).unwrap().summary, "s");
    }

    #[test]
    fn missing_comments_defaults_to_empty() {
        let fb = parse_feedback(r#"{"summary":"only summary"}"#).unwrap();
        assert!(fb.comments.is_empty());
    }

    #[test]
    fn severity_tags_parse() {
        let raw = r#"{"summary":"s","comments":[
            {"file":"a.rs","line":1,"comment":"c","severity":"critical"},
            {"file":"a.rs","line":2,"comment":"c","severity":"style"}
        ]}"#;
        let fb = parse_feedback(raw).unwrap();
        assert_eq!(fb.comments[0].severity, Some(Severity::Critical));
        assert_eq!(fb.comments[1].severity, Some(Severity::Style));
    }

    #[test]
    fn garbage_reply_keeps_raw_for_diagnosis() {
        let err = parse_feedback("Here is my review: the code looks fine.").unwrap_err();
        match err {
            ModelError::InvalidJson { raw, .. } => {
                assert!(raw.contains("looks fine"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
