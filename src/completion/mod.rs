// src/completion/mod.rs

//! Client for the remote chat-completion endpoint.
//!
//! `CompletionClient` owns the retry policy. The network itself sits behind
//! the [`Transport`] trait so the policy can be exercised without sockets;
//! [`HttpTransport`] is the `reqwest` implementation used in production.

use crate::secret::Credential;
use crate::signal::Generation;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Text shown (and nothing stored) when every attempt failed.
pub const FAILURE_PLACEHOLDER: &str = "Failed to retrieve AI response.";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("no completion after {attempts} attempt(s); last error: {last}")]
    Exhausted { attempts: u32, last: String },
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => CompletionError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => CompletionError::Malformed(err.to_string()),
            None => CompletionError::Transport(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    /// A single user message.
    pub fn user(model: &str, prompt: &str, temperature: f32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Trimmed content of the first choice.
    pub fn first_content(&self) -> Result<String, CompletionError> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| CompletionError::Malformed("response has no choices".to_string()))?;
        choice
            .message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .map(|text| text.trim().to_string())
            .ok_or_else(|| CompletionError::Malformed("first choice has no message content".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Total attempts, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Delay after failed attempt `k` is `backoff_base * 2^k`.
    pub backoff_base: Duration,
}

impl CompletionConfig {
    /// Retry policy of the given generation.
    pub fn for_generation(generation: Generation) -> Self {
        let (attempts, timeout) = match generation {
            Generation::Classic => (3, Duration::from_secs(10)),
            Generation::Hypertime => (1, Duration::from_secs(20)),
        };
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            attempts,
            timeout,
            backoff_base: Duration::from_secs(1),
        }
    }

    /// Delay to wait after failed attempt `k` (0-based).
    pub fn backoff_after(&self, k: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(k))
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self::for_generation(Generation::default())
    }
}

/// One request/response exchange with the endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ChatRequest, credential: &Credential) -> Result<ChatResponse, CompletionError>;
}

/// `reqwest` transport: JSON POST with bearer authentication.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| CompletionError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        Self::new(&config.endpoint, config.timeout)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatRequest, credential: &Credential) -> Result<ChatResponse, CompletionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<ChatResponse>().await?)
    }
}

/// Sends prompts with bounded retries.
pub struct CompletionClient<T> {
    transport: T,
    config: CompletionConfig,
}

impl<T: Transport> CompletionClient<T> {
    pub fn new(transport: T, config: CompletionConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Request a completion for `prompt`.
    ///
    /// Each failed attempt (transport error, HTTP error status, or a
    /// response without content) is logged and retried after
    /// `backoff_after(k)` until `attempts` are used up.
    pub async fn complete(&self, prompt: &str, credential: &Credential) -> Result<String, CompletionError> {
        let attempts = self.config.attempts.max(1);
        let request = ChatRequest::user(&self.config.model, prompt, self.config.temperature);
        let mut last = String::new();

        for k in 0..attempts {
            debug!(attempt = k + 1, of = attempts, model = %self.config.model, "sending completion request");
            let outcome = match self.transport.send(&request, credential).await {
                Ok(response) => response.first_content(),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(text) => {
                    info!(attempt = k + 1, chars = text.len(), "completion received");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(attempt = k + 1, of = attempts, error = %e, "completion attempt failed");
                    last = e.to_string();
                }
            }

            if k + 1 < attempts {
                tokio::time::sleep(self.config.backoff_after(k)).await;
            }
        }

        Err(CompletionError::Exhausted { attempts, last })
    }
}
