//! # Generator client abstraction
//!
//! Defines the [`Generator`] trait for the external text-generation service
//! and an OpenAI-compatible implementation. Every call is fallible and
//! bounded: the engine treats any error or timeout as "generator unavailable"
//! and switches to its deterministic fallback path, so a turn never blocks on
//! a stalled upstream.

use anyhow::Result;
use async_trait::async_trait;

mod config;
mod openai;

pub use config::EnvGeneratorConfig;
pub use openai::{mask_token, OpenAIGenerator};

/// Role of a chat message, one-to-one with chat-completions API role values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message sent to the generator.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A fully-assembled generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u16,
}

impl GenerationRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: 0.7,
            max_tokens: 800,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u16) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text-generation client interface.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the model reply text for the given request.
    async fn complete(&self, request: &GenerationRequest) -> Result<String>;
}
