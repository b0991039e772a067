//! OpenAI-compatible chat-completion generator.

use async_openai::{
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{ChatMessage, GenerationRequest, Generator, MessageRole};

/// Masks an API key for safe logging: first 7 chars + "***" + last 4 chars.
/// Keys of 11 chars or fewer become "***" so no part of them leaks.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// Generator backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAIGenerator {
    client: Client<async_openai::config::OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAIGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, None)
    }

    /// Creates a generator with an optional custom base URL for compatible
    /// endpoints.
    pub fn with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        debug!(api_key = %mask_token(&api_key), model = %model, "building generator client");
        let mut config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url.filter(|s| !s.is_empty()) {
            config = config.with_api_base(url);
        }
        Self {
            client: Client::with_config(config),
            model,
            timeout: Duration::from_secs(20),
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_openai_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, anyhow::Error> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

#[async_trait]
impl Generator for OpenAIGenerator {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, anyhow::Error> {
        let messages: Vec<ChatCompletionRequestMessage> = request
            .messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<_, _>>()?;

        let api_request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens as u32)
            .build()?;

        let chat = self.client.chat();
        let call = chat.create(api_request);
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => {
                warn!(error = %e, model = %self.model, "generator request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    model = %self.model,
                    "generator request timed out"
                );
                anyhow::bail!(
                    "generator request timed out after {} seconds",
                    self.timeout.as_secs()
                );
            }
        };

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("generator response contained no content"))?;

        debug!(reply_len = text.len(), "generator reply received");
        Ok(text)
    }
}
