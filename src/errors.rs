//! Crate-wide error hierarchy for pr-reviewer.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Provider-aware mapping (401→Unauthorized, 429→RateLimited, 5xx→Server, etc.).
//! - Ergonomic `?` via `From` impls, no dynamic dispatch.
//!
//! Per-comment posting failures are deliberately *not* part of this tree:
//! the publisher recovers them locally (counts + logs) and never aborts.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ReviewResult<T> = Result<T, Error>;

/// Root error type for the pr-reviewer crate.
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub API related failure (fatal for the run).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Chat-completion endpoint failure or unparsable model reply (fatal).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Configuration problems (missing env vars, bad base URL, etc.).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No changed file matched the extension filter. Non-fatal: the run
    /// short-circuits with a no-op success and exit code 0.
    #[error("no relevant changes in the pull request")]
    NoRelevantChanges,

    /// Input validation errors (bad repo slug, zero PR number, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// True for the graceful early-exit path (exit code 0).
    pub fn is_graceful(&self) -> bool {
        matches!(self, Error::NoRelevantChanges)
    }
}

/// Detailed hosting-API error used inside the GitHub layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway/Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (4xx/3xx) not covered above.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Chat-completion endpoint errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Non-2xx status from the completion endpoint.
    #[error("model endpoint status {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    /// The response carried no usable `choices[0].message.content`.
    #[error("model response contained no choices")]
    EmptyChoices,

    /// The completion text could not be parsed as the expected JSON shape,
    /// even after stripping code fences. The raw text is kept for diagnosis.
    #[error("model reply is not valid review JSON: {source}")]
    InvalidJson {
        source: serde_json::Error,
        raw: String,
    },

    /// Timeout at transport level.
    #[error("model request timeout")]
    Timeout,

    /// Network/transport failure without status.
    #[error("model network error: {0}")]
    Network(String),
}

/// Configuration and setup errors (missing env vars, bad base URL, etc.).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },

    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(ProviderError::from(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => ProviderError::Unauthorized,
                403 => ProviderError::Forbidden,
                404 => ProviderError::NotFound,
                429 => ProviderError::RateLimited,
                500..=599 => ProviderError::Server(code),
                _ => ProviderError::HttpStatus(code),
            };
        }
        ProviderError::Network(e.to_string())
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ModelError::Timeout;
        }
        ModelError::Network(e.to_string())
    }
}
