//! Public entry for the pr-reviewer pipeline.
//!
//! Single high-level function to run the whole review for one pull request:
//!
//! 1) **Fetch** — PR metadata (`head.sha`, author) and the changed-file
//!    list with unified-diff patch text.
//! 2) **Analyze** — per reviewable file, extract the set of new-file line
//!    numbers that may carry an inline comment.
//! 3) **Request** — build one prompt embedding all patches, call the
//!    chat-completion endpoint, parse the structured reply.
//! 4) **Publish** — one summary comment (idempotent across reruns) plus
//!    inline comments snapped to valid lines; per-item failures are
//!    counted, never fatal.
//!
//! Data flows strictly forward; nothing persists between runs. The
//! pipeline uses `tracing` for step logging and plain `async fn` with a
//! config struct passed by parameter (no globals).

pub mod config;
pub mod errors;
pub mod github;
pub mod patch;
pub mod publish;
pub mod review;

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use config::ReviewConfig;
use errors::{Error, ReviewResult};
use github::GitHubClient;
use patch::extract_valid_comment_lines;
use publish::PublishReport;
use review::llm::OpenAiClient;

/// Final accounting for one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Files whose patches were sent to the model.
    pub reviewed_files: usize,
    /// Publisher outcome (summary + inline counts).
    pub publish: PublishReport,
}

/// Runs the full review pipeline for the configured pull request.
///
/// # Errors
/// - `Error::NoRelevantChanges` when nothing matches the extension filter
///   or the PR has no changed files — callers treat this as a no-op success.
/// - `Error::Provider` / `Error::Model` are fatal for the run.
pub async fn run_review(cfg: &ReviewConfig) -> ReviewResult<RunReport> {
    let t0 = Instant::now();

    // ------------------------------
    // Step 1: fetch meta + changed files
    // ------------------------------
    let client = GitHubClient::from_config(cfg)?;
    debug!("step1: fetch meta for {}#{}", cfg.repo, cfg.pr_number);
    let meta = client.get_meta(cfg.pr_number).await?;
    debug!("step1: meta ok, head_sha={}", meta.head_sha);

    let files = client.list_changed_files(cfg.pr_number).await?;
    info!("step1: changed files={}", files.len());
    for f in &files {
        debug!("step1: file {} ({}, +{} -{})", f.filename, f.status, f.additions, f.deletions);
    }
    if files.is_empty() {
        return Err(Error::NoRelevantChanges);
    }

    // ------------------------------
    // Step 2: valid inline-comment lines per file
    // ------------------------------
    let mut valid_lines: HashMap<String, Vec<u32>> = HashMap::new();
    for f in &files {
        if let Some(patch) = &f.patch {
            let lines = extract_valid_comment_lines(patch);
            debug!("step2: {} → {} commentable lines", f.filename, lines.len());
            valid_lines.insert(f.filename.clone(), lines);
        }
    }

    // ------------------------------
    // Step 3: prompt → model → structured feedback
    // ------------------------------
    let inputs = review::collect_review_inputs(cfg, &client, &meta, &files).await?;
    info!("step3: reviewing {} file(s)", inputs.len());
    let llm = OpenAiClient::from_config(cfg)?;
    let feedback = review::request_review(&llm, &inputs).await?;

    // ------------------------------
    // Step 4: publish summary + inline comments
    // ------------------------------
    let report = publish::publish_review(cfg, &client, &meta, &feedback, &valid_lines).await?;

    info!(
        "review done in {} ms (files={}, inline posted={}, failed={})",
        t0.elapsed().as_millis(),
        inputs.len(),
        report.inline_posted,
        report.inline_failed
    );

    Ok(RunReport {
        reviewed_files: inputs.len(),
        publish: report,
    })
}
