//! LLM provider trait and streaming types

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;

use super::{Error, Result};

/// Configuration for text generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: Some(0.7),
            timeout: Duration::from_secs(60),
        }
    }
}

/// A system/user message pair handed to a provider unmodified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// One normalized event of a provider response stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Incremental text
    Delta(String),
    /// End-of-stream sentinel, emitted exactly once
    Done,
}

/// Stream of text deltas terminated by [`StreamEvent::Done`]
pub type TextStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Result of a completed (collected) generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
}

/// Trait for streaming chat-completion providers (OpenAI, Anthropic, Google)
///
/// Implementations translate a [`CompletionRequest`] into the provider's wire format
/// and normalize the provider's incremental payloads into [`StreamEvent`]s.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Open a response stream for the request
    async fn stream(
        &self,
        request: &CompletionRequest,
        config: &GenerationConfig,
    ) -> Result<TextStream>;

    /// Generate and collect the whole response
    async fn generate(
        &self,
        request: &CompletionRequest,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let stream = self.stream(request, config).await?;
        let text = collect_text(stream).await?;

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
        })
    }

    /// Get the model ID being used
    fn model_id(&self) -> &str;

    /// Generation config bound to this provider's model
    fn default_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.model_id().to_string(),
            ..Default::default()
        }
    }
}

/// Concatenate deltas until the end-of-stream sentinel
pub async fn collect_text(mut stream: TextStream) -> Result<String> {
    let mut text = String::new();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Delta(delta) => text.push_str(&delta),
            StreamEvent::Done => return Ok(text),
        }
    }

    if text.is_empty() {
        return Err(Error::Provider("Stream ended without any content".to_string()));
    }

    Ok(text)
}
