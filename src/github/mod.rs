//! GitHub REST v3 client for pull request review runs.
//!
//! Endpoints used:
//! - GET  /repos/{repo}/pulls/{number}            (meta: head sha, author)
//! - GET  /repos/{repo}/pulls/{number}/files      (field "patch" is unified diff)
//! - GET  /repos/{repo}/contents/{path}?ref=...   (base64 content for context)
//! - GET  /repos/{repo}/issues/{number}/comments  (duplicate-summary check)
//! - POST /repos/{repo}/issues/{number}/comments  (summary; 201 on success)
//! - POST /repos/{repo}/pulls/{number}/comments   (inline; 201 on success)

pub mod types;
pub use types::*;

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::config::ReviewConfig;
use crate::errors::{ProviderError, ReviewResult};

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // e.g. "https://api.github.com"
    repo: String,     // "owner/name"
}

impl GitHubClient {
    /// Constructs a client with auth/accept default headers and explicit
    /// timeouts (the hosting API gets no implicit infinite waits).
    pub fn from_config(cfg: &ReviewConfig) -> ReviewResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cfg.github_token))
                .map_err(|e| ProviderError::InvalidResponse(format!("bad token header: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("pr-reviewer/0.1"));

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_api: cfg.github_api.trim_end_matches('/').to_string(),
            repo: cfg.repo.clone(),
        })
    }

    /// Fetches PR metadata: head SHA (anchor for inline comments) and the
    /// author login (addressed in the summary).
    pub async fn get_meta(&self, pr_number: u64) -> ReviewResult<PullRequestMeta> {
        let url = format!("{}/repos/{}/pulls/{}", self.base_api, self.repo, pr_number);
        debug!("GET {}", url);
        let resp: GitHubPull = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(PullRequestMeta {
            number: resp.number,
            title: resp.title,
            state: resp.state,
            author_login: resp.user.login,
            head_sha: resp.head.sha,
            created_at: resp.created_at,
            updated_at: resp.updated_at,
        })
    }

    /// Fetches the ordered list of changed files with their patch text.
    /// `patch` is absent for binary or oversized files.
    pub async fn list_changed_files(&self, pr_number: u64) -> ReviewResult<Vec<ChangedFile>> {
        let url = format!(
            "{}/repos/{}/pulls/{}/files?per_page=100",
            self.base_api, self.repo, pr_number
        );
        debug!("GET {}", url);
        let files: Vec<ChangedFile> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(files)
    }

    /// Fetches file content at a git ref, decoded from the base64 payload.
    ///
    /// Returns `Ok(None)` on 404 (file absent at that ref) and for payloads
    /// that are not valid UTF-8 after decoding.
    pub async fn get_file_content(
        &self,
        path: &str,
        git_ref: &str,
    ) -> ReviewResult<Option<String>> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.base_api, self.repo, path, git_ref
        );
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: GitHubContents = resp.error_for_status()?.json().await?;

        // The contents API wraps base64 at 60 columns; strip newlines first.
        let decoded = general_purpose::STANDARD
            .decode(body.content.replace('\n', ""))
            .map_err(|e| ProviderError::InvalidResponse(format!("bad base64 content: {e}")))?;
        Ok(String::from_utf8(decoded).ok())
    }

    /// Lists existing PR conversation comments (issue comments).
    pub async fn list_issue_comments(&self, pr_number: u64) -> ReviewResult<Vec<IssueComment>> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments?per_page=100",
            self.base_api, self.repo, pr_number
        );
        debug!("GET {}", url);

        #[derive(Deserialize)]
        struct Raw {
            body: Option<String>,
            user: Option<GitHubUser>,
        }

        let raw: Vec<Raw> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(raw
            .into_iter()
            .map(|c| IssueComment {
                body: c.body,
                author_login: c.user.map(|u| u.login),
            })
            .collect())
    }

    /// Posts a PR conversation comment. The API answers 201 on success.
    pub async fn post_issue_comment(&self, pr_number: u64, body: &str) -> ReviewResult<()> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.base_api, self.repo, pr_number
        );

        #[derive(serde::Serialize)]
        struct Req<'a> {
            body: &'a str,
        }

        debug!("POST {}", url);
        let resp = self.http.post(&url).json(&Req { body }).send().await?;
        expect_created(resp).await
    }

    /// Posts an inline review comment anchored to the new side of the diff.
    pub async fn post_review_comment(
        &self,
        pr_number: u64,
        commit_sha: &str,
        path: &str,
        line: u32,
        body: &str,
    ) -> ReviewResult<()> {
        let url = format!(
            "{}/repos/{}/pulls/{}/comments",
            self.base_api, self.repo, pr_number
        );

        #[derive(serde::Serialize)]
        struct Req<'a> {
            body: &'a str,
            commit_id: &'a str,
            path: &'a str,
            side: &'a str,
            line: u32,
        }

        let req = Req {
            body,
            commit_id: commit_sha,
            path,
            side: "RIGHT",
            line,
        };

        debug!("POST {} path={} line={}", url, path, line);
        let resp = self.http.post(&url).json(&req).send().await?;
        expect_created(resp).await
    }
}

/// Write endpoints answer 201; anything else is a provider error carrying
/// the status so the caller can log and decide.
async fn expect_created(resp: reqwest::Response) -> ReviewResult<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let code = status.as_u16();
    debug!(
        "write rejected: status={} body={:?}",
        code,
        resp.text().await.ok()
    );
    Err(match code {
        401 => ProviderError::Unauthorized,
        403 => ProviderError::Forbidden,
        404 => ProviderError::NotFound,
        429 => ProviderError::RateLimited,
        500..=599 => ProviderError::Server(code),
        _ => ProviderError::HttpStatus(code),
    }
    .into())
}

/// --- GitHub response shapes (subset of fields we actually use) ---

#[derive(Debug, Deserialize)]
struct GitHubPull {
    number: u64,
    title: String,
    state: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    head: GitHubHead,
    user: GitHubUser,
}

#[derive(Debug, Deserialize)]
struct GitHubHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubContents {
    content: String,
}
