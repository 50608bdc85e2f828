//! Runtime configuration, read once from the environment at process start
//! and passed by parameter into every stage (no module-level globals).

use crate::errors::ConfigError;

/// Everything one review run needs. Constructed once in `main`.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Repository slug, e.g. "owner/name".
    pub repo: String,
    /// Pull request number.
    pub pr_number: u64,
    /// Hosting API token (PAT or app token).
    pub github_token: String,
    /// API base, e.g. "https://api.github.com".
    pub github_api: String,
    /// Chat-completion API key.
    pub openai_api_key: String,
    /// Chat-completion API base, e.g. "https://api.openai.com".
    pub openai_api: String,
    /// Model name sent to the completion endpoint.
    pub model: String,
    /// Lowercase file extensions (no leading dot) eligible for review.
    pub file_extensions: Vec<String>,
    /// Also fetch full file content at head SHA for prompt context.
    pub include_file_context: bool,
    /// Bot account login; when set, the duplicate-summary check also
    /// requires the existing comment author to match.
    pub bot_login: Option<String>,
    /// Per-request timeout for both APIs, seconds.
    pub request_timeout_secs: u64,
}

impl ReviewConfig {
    /// Reads configuration from the environment.
    ///
    /// Required: `REPO`, `PR_NUMBER`, `GITHUB_TOKEN`, `OPENAI_API_KEY`.
    /// Everything else has defaults (see crate docs).
    pub fn from_env() -> Result<Self, ConfigError> {
        let repo = require("REPO")?;
        if !repo.contains('/') {
            return Err(ConfigError::InvalidVar {
                var: "REPO",
                value: repo,
            });
        }
        let pr_raw = require("PR_NUMBER")?;
        let pr_number: u64 = pr_raw.parse().map_err(|_| ConfigError::InvalidVar {
            var: "PR_NUMBER",
            value: pr_raw,
        })?;

        let github_api = env_or("GITHUB_API_URL", "https://api.github.com");
        let openai_api = env_or("OPENAI_API_URL", "https://api.openai.com");
        for url in [&github_api, &openai_api] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidBaseUrl(url.clone()));
            }
        }

        let file_extensions = env_or("REVIEW_FILE_EXTENSIONS", "rs")
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            repo,
            pr_number,
            github_token: require("GITHUB_TOKEN")?,
            github_api,
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_api,
            model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            file_extensions,
            include_file_context: env_bool("REVIEW_INCLUDE_FILE_CONTEXT", false),
            bot_login: std::env::var("REVIEW_BOT_LOGIN").ok().filter(|s| !s.is_empty()),
            request_timeout_secs: env_u64("REVIEW_HTTP_TIMEOUT_SECS", 30),
        })
    }

    /// True when `path` ends with one of the configured extensions.
    pub fn matches_extension(&self, path: &str) -> bool {
        let ext = match path.rsplit_once('.') {
            Some((_, e)) => e.to_ascii_lowercase(),
            None => return false,
        };
        self.file_extensions.iter().any(|e| *e == ext)
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(key))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_with_exts(exts: &[&str]) -> ReviewConfig {
        ReviewConfig {
            repo: "octo/demo".into(),
            pr_number: 1,
            github_token: "t".into(),
            github_api: "https://api.github.com".into(),
            openai_api_key: "k".into(),
            openai_api: "https://api.openai.com".into(),
            model: "gpt-4o-mini".into(),
            file_extensions: exts.iter().map(|s| s.to_string()).collect(),
            include_file_context: false,
            bot_login: None,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let cfg = cfg_with_exts(&["rs", "swift"]);
        assert!(cfg.matches_extension("src/lib.rs"));
        assert!(cfg.matches_extension("App/Main.SWIFT"));
        assert!(!cfg.matches_extension("README.md"));
        assert!(!cfg.matches_extension("Makefile"));
    }
}
