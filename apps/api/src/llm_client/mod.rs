/// LLM Client: the single point of entry for every chat-completion call.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through this module; callers decide what to
/// do with a failure (every caller has a local fallback).
///
/// Both providers speak the OpenAI-compatible `/chat/completions` protocol with
/// forced tool calling. Model names are fixed per provider.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Quota exhausted")]
    QuotaExhausted,

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("{0} API key is not configured")]
    NotConfigured(&'static str),
}

/// The upstream providers. Moonshot serves the matching flow, Tuzi the news feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Moonshot,
    Tuzi,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Moonshot => "https://api.moonshot.cn/v1",
            Provider::Tuzi => "https://api.tu-zi.com/v1",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Provider::Moonshot => "moonshot-v1-8k",
            Provider::Tuzi => "deepseek-chat",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            Provider::Moonshot => "KIMI",
            Provider::Tuzi => "TUZI",
        }
    }
}

/// A declared function the model is forced to call.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

impl ToolSpec {
    fn definition(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }

    fn choice(&self) -> Value {
        json!({ "type": "function", "function": { "name": self.name } })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionRaw {
    #[serde(default)]
    choices: Vec<ChoiceRaw>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRaw {
    message: MessageRaw,
}

#[derive(Debug, Deserialize)]
struct MessageRaw {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallRaw>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallRaw {
    function: FunctionRaw,
}

#[derive(Debug, Deserialize)]
struct FunctionRaw {
    arguments: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// What the model actually answered with. Parsing is left to `normalize`.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPayload {
    /// Raw `function.arguments` of the first tool call. May be truncated JSON.
    Arguments(String),
    /// Plain message content, when the model ignored the tool.
    Content(String),
    Empty,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub payload: ToolPayload,
    pub usage: Option<Usage>,
}

impl ChatCompletionRaw {
    fn into_completion(self) -> Completion {
        let message = self.choices.into_iter().next().map(|c| c.message);

        let payload = match message {
            None => ToolPayload::Empty,
            Some(message) => {
                let arguments = message
                    .tool_calls
                    .and_then(|calls| calls.into_iter().next())
                    .and_then(|call| call.function.arguments)
                    .filter(|args| !args.trim().is_empty());

                match (arguments, message.content) {
                    (Some(args), _) => ToolPayload::Arguments(args),
                    (None, Some(content)) if !content.trim().is_empty() => {
                        ToolPayload::Content(content)
                    }
                    _ => ToolPayload::Empty,
                }
            }
        };

        Completion {
            payload,
            usage: self.usage,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat-completions client for one provider, with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: Provider,
    api_key: Option<String>,
    base_url: String,
    retry_delay: std::time::Duration,
}

impl LlmClient {
    pub fn new(provider: Provider, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            provider,
            api_key,
            base_url: provider.default_base_url().to_string(),
            retry_delay: std::time::Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Base delay of the exponential backoff (1x, 2x, 4x...).
    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: std::time::Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a raw chat-completion call. With `tool` set, the model is forced to call it.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        messages: &[ChatMessage],
        tool: Option<&ToolSpec>,
    ) -> Result<Completion, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured(self.provider.key_name()))?;

        let request_body = ChatRequest {
            model: self.provider.model(),
            messages,
            tools: tool.map(|t| vec![t.definition()]),
            tool_choice: tool.map(ToolSpec::choice),
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_error: Option<LlmError> = None;
        let mut rate_limited = false;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_delay * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("{:?} API returned {}: {}", self.provider, status, body);
                rate_limited = status.as_u16() == 429;
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if status.as_u16() == 402 {
                return Err(LlmError::QuotaExhausted);
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let raw: ChatCompletionRaw = response.json().await?;
            let completion = raw.into_completion();

            if let Some(usage) = &completion.usage {
                debug!(
                    "LLM call succeeded: provider={:?} prompt_tokens={} completion_tokens={}",
                    self.provider, usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(completion);
        }

        if rate_limited {
            return Err(LlmError::RateLimited {
                retries: MAX_RETRIES,
            });
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// System + user prompt with a forced tool. Fails with `EmptyContent` when the
    /// model returned neither tool arguments nor text.
    pub async fn call_tool(
        &self,
        system: &str,
        prompt: &str,
        tool: &ToolSpec,
    ) -> Result<Completion, LlmError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        let completion = self.call(&messages, Some(tool)).await?;
        if completion.payload == ToolPayload::Empty {
            return Err(LlmError::EmptyContent);
        }
        Ok(completion)
    }
}
