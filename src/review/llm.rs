//! Thin OpenAI chat-completion client (non-streaming).
//!
//! Single endpoint: POST {base}/v1/chat/completions with an optional system
//! message and the user prompt. The reply's `choices[0].message.content` is
//! returned as plain text; interpretation (JSON parsing) happens upstream.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::ReviewConfig;
use crate::errors::{ConfigError, Error, ModelError, ReviewResult};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    url_chat: String,
    model: String,
}

impl OpenAiClient {
    /// Builds a client with bearer auth, JSON headers and a request timeout.
    ///
    /// # Errors
    /// `ConfigError::InvalidBaseUrl` when the endpoint does not use
    /// http/https; transport errors if the HTTP client cannot be built.
    pub fn from_config(cfg: &ReviewConfig) -> ReviewResult<Self> {
        let endpoint = cfg.openai_api.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::Config(ConfigError::InvalidBaseUrl(endpoint.into())));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.openai_api_key))
                .map_err(|e| Error::Validation(format!("invalid API key header: {e}")))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs.max(60)))
            .default_headers(headers)
            .build()?;

        let url_chat = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));

        Ok(Self {
            http,
            url_chat,
            model: cfg.model.clone(),
        })
    }

    /// Performs one non-streaming chat completion and returns the message
    /// content.
    ///
    /// # Errors
    /// - `ModelError::HttpStatus` for non-2xx responses (body snippet kept)
    /// - `ModelError::Timeout` / `Network` for transport failures
    /// - `ModelError::EmptyChoices` when no content comes back
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, ModelError> {
        let started = Instant::now();
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage {
                role: "system",
                content: sys,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            has_system = system.is_some(),
            "POST {}", self.url_chat
        );

        let resp = self.http.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(300).collect();
            error!(
                status,
                %snippet,
                model = %self.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );
            return Err(ModelError::HttpStatus { status, snippet });
        }

        let out: ChatCompletionResponse = resp.json().await?;
        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or(ModelError::EmptyChoices)?;

        info!(
            model = %self.model,
            latency_ms = started.elapsed().as_millis(),
            reply_len = content.len(),
            "chat completion completed"
        );

        Ok(content)
    }
}

/// Minimal request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
