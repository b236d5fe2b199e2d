#[cfg(test)]
pub(crate) mod mock;

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use tracing::info;

use crate::config::AnalystConfig;
use crate::constants::llm::SYSTEM_PROMPT;
use crate::credentials::ApiKey;
use crate::error::AnalystError;

/// One chat completion: a system instruction plus one user prompt.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the endpoint to constrain output to a single JSON object
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn json(config: &AnalystConfig, user_prompt: impl Into<String>) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: user_prompt.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            json_mode: true,
        }
    }
}

/// The hosted inference capability: prompt in, raw completion text out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AnalystError>;
}

/// OpenAI-compatible client pointed at Groq (or any `base_url`).
#[derive(Clone)]
pub struct LLMClient {
    pub client: Client<OpenAIConfig>,
}

impl LLMClient {
    pub fn new(api_key: &ApiKey, base_url: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose())
            .with_api_base(base_url);

        // One request per call: a zero elapsed-time budget stops async-openai's
        // rate-limit retry loop after the first attempt.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(config).with_backoff(no_retry);
        Self { client }
    }

    pub fn from_config(api_key: &ApiKey, config: &AnalystConfig) -> Self {
        Self::new(api_key, &config.base_url)
    }
}

#[async_trait]
impl ChatBackend for LLMClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AnalystError> {
        info!("🤖 Sending request to LLM (Model: {})...", request.model);

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&request.model)
            .messages([
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(request.system_prompt.as_str())
                        .build()?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(request.user_prompt.as_str())
                        .build()?,
                ),
            ])
            .temperature(request.temperature)
            .max_tokens(request.max_tokens);
        if request.json_mode {
            args.response_format(ResponseFormat::JsonObject);
        }
        let chat_request = args.build()?;

        let response = self.client.chat().create(chat_request).await?;

        info!("🤖 LLM Response received.");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AnalystError::EmptyResponse)
    }
}
