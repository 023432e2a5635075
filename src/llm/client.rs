use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::llm::prompts::{
    build_sentiment_prompt, build_summary_prompt, ToolSpec, SENTIMENT_SYSTEM_PROMPT,
    SENTIMENT_TOOL, SUMMARY_SYSTEM_PROMPT, SUMMARY_TOOL,
};
use crate::models::Transcript;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// The two analyses the pipeline asks of a language model
///
/// Implementations perform exactly one remote call per invocation and never
/// retry; retry policy lives in the pipeline.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produce a 2-3 sentence business summary of the call
    async fn summarize(&self, transcript: &Transcript) -> std::result::Result<String, ModelError>;

    /// Produce a free-text label for the customer's emotional state
    async fn classify_sentiment(
        &self,
        transcript: &Transcript,
    ) -> std::result::Result<String, ModelError>;
}

/// Configuration for the chat-completions client
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API key (from GROQ_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "llama-3.3-70b-versatile")
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// OpenAI-compatible API root, without the trailing `/chat/completions`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Cut the transcript embedded in prompts to this many characters
    pub max_transcript_chars: Option<usize>,
}

impl ModelConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("GROQ_API_KEY").context("GROQ_API_KEY environment variable not set")?;

        let mut config = Self::new(api_key, DEFAULT_MODEL.to_string());

        if let Ok(model) = std::env::var("GROQ_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("GROQ_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(temperature) = std::env::var("GROQ_TEMPERATURE") {
            config.temperature = temperature
                .parse()
                .with_context(|| format!("Invalid GROQ_TEMPERATURE: {}", temperature))?;
        }
        if let Ok(max_tokens) = std::env::var("GROQ_MAX_TOKENS") {
            config.max_tokens = max_tokens
                .parse()
                .with_context(|| format!("Invalid GROQ_MAX_TOKENS: {}", max_tokens))?;
        }

        Ok(config)
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: 1024,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_transcript_chars: None,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Groq (OpenAI-compatible) chat-completions client
pub struct GroqClient {
    client: Client,
    config: ModelConfig,
}

impl GroqClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Send a prompt with one forced tool call and return the tool arguments
    pub async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> std::result::Result<serde_json::Value, ModelError> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            tools: vec![Tool {
                tool_type: "function",
                function: FunctionDef {
                    name: tool.name,
                    description: tool.description,
                    parameters: tool.parameters(),
                },
            }],
            tool_choice: ToolChoice {
                choice_type: "function",
                function: ToolChoiceFunction { name: tool.name },
            },
        };

        debug!(
            "Requesting {} from {} (temperature {})",
            tool.name, self.config.model, self.config.temperature
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let body = response.text().await?;
        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ModelError::Malformed(format!("invalid response body: {}", e)))?;

        // Find the forced tool call
        let call = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.tool_calls)
            .and_then(|calls| calls.into_iter().find(|c| c.function.name == tool.name))
            .ok_or_else(|| ModelError::Malformed(format!("no {} tool call in response", tool.name)))?;

        serde_json::from_str(&call.function.arguments).map_err(|e| {
            ModelError::Malformed(format!("tool arguments are not valid JSON: {}", e))
        })
    }

    /// Run a tool call and pull its single text field out verbatim
    async fn generate_field(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> std::result::Result<String, ModelError> {
        let arguments = self.generate_structured(system, user, tool).await?;

        let text = match arguments.get(tool.field) {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => {
                return Err(ModelError::Malformed(format!(
                    "field '{}' is not a string: {}",
                    tool.field, other
                )));
            }
            None => return Err(ModelError::Empty { field: tool.field }),
        };

        if text.trim().is_empty() {
            return Err(ModelError::Empty { field: tool.field });
        }

        Ok(text)
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn summarize(&self, transcript: &Transcript) -> std::result::Result<String, ModelError> {
        let prompt = build_summary_prompt(transcript.as_str(), self.config.max_transcript_chars);
        self.generate_field(SUMMARY_SYSTEM_PROMPT, &prompt, &SUMMARY_TOOL)
            .await
    }

    async fn classify_sentiment(
        &self,
        transcript: &Transcript,
    ) -> std::result::Result<String, ModelError> {
        let prompt = build_sentiment_prompt(transcript.as_str(), self.config.max_transcript_chars);
        self.generate_field(SENTIMENT_SYSTEM_PROMPT, &prompt, &SENTIMENT_TOOL)
            .await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    tools: Vec<Tool>,
    tool_choice: ToolChoice,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: FunctionDef,
}

#[derive(Debug, Serialize)]
struct FunctionDef {
    name: &'static str,
    description: &'static str,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: &'static str,
    function: ToolChoiceFunction,
}

#[derive(Debug, Serialize)]
struct ToolChoiceFunction {
    name: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments, as a string
    arguments: String,
}
