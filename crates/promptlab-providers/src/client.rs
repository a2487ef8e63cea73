//! Streaming chat client for OpenAI, Anthropic and Google

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{future, stream, Stream, StreamExt};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

use promptlab_core::{
    CompletionRequest, Error, GenerationConfig, LLMProvider, Result, StreamEvent, TextStream,
};

use crate::config::{ProviderConfig, ProviderKind};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Chat client relaying a provider's SSE stream as normalized [`StreamEvent`]s
pub struct ChatClient {
    config: ProviderConfig,
    client: Client,
}

impl ChatClient {
    /// Create a new client from configuration
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = ProviderConfig::from_env()?;
        Self::new(config)
    }

    fn endpoint(&self, model: &str) -> String {
        let base = &self.config.base_url;
        match self.config.provider {
            ProviderKind::OpenAI => format!("{}/v1/chat/completions", base),
            ProviderKind::Anthropic => format!("{}/v1/messages", base),
            ProviderKind::Google => format!(
                "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
                base, model
            ),
        }
    }

    fn build_request(&self, request: &CompletionRequest, config: &GenerationConfig) -> RequestBuilder {
        let body = request_body(self.config.provider, request, config);
        let builder = self
            .client
            .post(self.endpoint(&config.model_id))
            .header("Accept", "text/event-stream")
            .header("Content-Type", "application/json");

        let builder = match self.config.provider {
            ProviderKind::OpenAI => {
                builder.header("Authorization", format!("Bearer {}", self.config.api_key))
            }
            ProviderKind::Anthropic => builder
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            ProviderKind::Google => builder.header("x-goog-api-key", &self.config.api_key),
        };

        builder.json(&body)
    }
}

#[async_trait]
impl LLMProvider for ChatClient {
    async fn stream(
        &self,
        request: &CompletionRequest,
        config: &GenerationConfig,
    ) -> Result<TextStream> {
        let provider = self.config.provider;
        tracing::debug!(%provider, model = %config.model_id, "Opening completion stream");

        let response = timeout(config.timeout, self.build_request(request, config).send())
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "{} request timed out after {}s",
                    provider,
                    config.timeout.as_secs()
                ))
            })?
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Provider(format!(
                "{} API request failed with status {}: {}",
                provider, status, error_text
            )));
        }

        let payloads = response.bytes_stream().eventsource().map(|event| {
            event
                .map(|event| event.data)
                .map_err(|e| Error::Network(e.to_string()))
        });

        Ok(relay_events(provider, payloads))
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

/// Normalize raw SSE `data` payloads into a stream that ends with exactly one
/// [`StreamEvent::Done`], or stops after the first error.
pub fn relay_events<S>(provider: ProviderKind, payloads: S) -> TextStream
where
    S: Stream<Item = Result<String>> + Send + 'static,
{
    let events = payloads
        .map(move |payload| payload.and_then(|data| parse_event(provider, &data)))
        .filter_map(|event| future::ready(event.transpose()))
        .chain(stream::once(future::ready(Ok(StreamEvent::Done))))
        .scan(false, |finished, event| {
            if *finished {
                return future::ready(None);
            }
            *finished = !matches!(event, Ok(StreamEvent::Delta(_)));
            future::ready(Some(event))
        });

    Box::pin(events)
}

/// Interpret one SSE `data` payload.
///
/// Returns `Ok(None)` for keep-alives, bookkeeping events and payloads that carry
/// no text. Error payloads from the provider surface as [`Error::Provider`].
pub fn parse_event(provider: ProviderKind, data: &str) -> Result<Option<StreamEvent>> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }
    if provider == ProviderKind::OpenAI && data == "[DONE]" {
        return Ok(Some(StreamEvent::Done));
    }

    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(%provider, "Failed to parse stream payload: {} - Error: {}", data, e);
            return Ok(None);
        }
    };

    if let Some(message) = value["error"]["message"].as_str() {
        return Err(Error::Provider(format!("{} stream error: {}", provider, message)));
    }

    let event = match provider {
        ProviderKind::OpenAI => value["choices"][0]["delta"]["content"]
            .as_str()
            .map(|text| StreamEvent::Delta(text.to_string())),
        ProviderKind::Anthropic => match value["type"].as_str() {
            Some("content_block_delta") => value["delta"]["text"]
                .as_str()
                .map(|text| StreamEvent::Delta(text.to_string())),
            Some("message_stop") => Some(StreamEvent::Done),
            _ => None,
        },
        ProviderKind::Google => {
            let text: String = value["candidates"][0]["content"]["parts"]
                .as_array()
                .map(|parts| parts.iter().filter_map(|part| part["text"].as_str()).collect())
                .unwrap_or_default();
            Some(StreamEvent::Delta(text))
        }
    };

    Ok(event.filter(|event| !matches!(event, StreamEvent::Delta(text) if text.is_empty())))
}

/// Build the provider-specific JSON request body
pub fn request_body(
    provider: ProviderKind,
    request: &CompletionRequest,
    config: &GenerationConfig,
) -> Value {
    let mut body = match provider {
        ProviderKind::OpenAI => {
            let mut messages = Vec::new();
            if let Some(system_prompt) = &request.system_prompt {
                messages.push(json!({ "role": "system", "content": system_prompt }));
            }
            messages.push(json!({ "role": "user", "content": request.prompt }));

            json!({
                "model": config.model_id,
                "messages": messages,
                "max_tokens": config.max_tokens,
                "stream": true,
            })
        }
        ProviderKind::Anthropic => {
            let mut body = json!({
                "model": config.model_id,
                "messages": [{ "role": "user", "content": request.prompt }],
                "max_tokens": config.max_tokens,
                "stream": true,
            });
            if let Some(system_prompt) = &request.system_prompt {
                body["system"] = json!(system_prompt);
            }
            body
        }
        ProviderKind::Google => {
            let mut body = json!({
                "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
                "generationConfig": { "maxOutputTokens": config.max_tokens },
            });
            if let Some(system_prompt) = &request.system_prompt {
                body["systemInstruction"] = json!({ "parts": [{ "text": system_prompt }] });
            }
            body
        }
    };

    if let Some(temperature) = config.temperature {
        match provider {
            ProviderKind::Google => body["generationConfig"]["temperature"] = json!(temperature),
            _ => body["temperature"] = json!(temperature),
        }
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_events() {
        let delta = r#"{"choices":[{"index":0,"delta":{"content":"Hel"}}]}"#;
        assert_eq!(
            parse_event(ProviderKind::OpenAI, delta).unwrap(),
            Some(StreamEvent::Delta("Hel".to_string()))
        );
        assert_eq!(
            parse_event(ProviderKind::OpenAI, "[DONE]").unwrap(),
            Some(StreamEvent::Done)
        );

        let role_only = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_event(ProviderKind::OpenAI, role_only).unwrap(), None);
    }

    #[test]
    fn test_anthropic_events() {
        let delta = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#;
        assert_eq!(
            parse_event(ProviderKind::Anthropic, delta).unwrap(),
            Some(StreamEvent::Delta("Hi".to_string()))
        );
        assert_eq!(
            parse_event(ProviderKind::Anthropic, r#"{"type":"ping"}"#).unwrap(),
            None
        );
        assert_eq!(
            parse_event(ProviderKind::Anthropic, r#"{"type":"message_stop"}"#).unwrap(),
            Some(StreamEvent::Done)
        );

        let error = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert!(matches!(
            parse_event(ProviderKind::Anthropic, error),
            Err(Error::Provider(ref msg)) if msg.contains("Overloaded")
        ));
    }

    #[test]
    fn test_google_events_concatenate_parts() {
        let chunk = r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}],"role":"model"}}]}"#;
        assert_eq!(
            parse_event(ProviderKind::Google, chunk).unwrap(),
            Some(StreamEvent::Delta("ab".to_string()))
        );

        let usage_only = r#"{"usageMetadata":{"promptTokenCount":3}}"#;
        assert_eq!(parse_event(ProviderKind::Google, usage_only).unwrap(), None);
    }

    #[test]
    fn test_garbage_payload_is_skipped() {
        assert_eq!(parse_event(ProviderKind::OpenAI, "not json").unwrap(), None);
        assert_eq!(parse_event(ProviderKind::Google, "   ").unwrap(), None);
    }

    #[test]
    fn test_request_bodies_carry_system_prompt() {
        let request = CompletionRequest::new("Summarize this").with_system_prompt("You are terse");
        let config = GenerationConfig {
            temperature: None,
            ..Default::default()
        };

        let openai = request_body(ProviderKind::OpenAI, &request, &config);
        assert_eq!(openai["messages"][0]["role"], "system");
        assert_eq!(openai["messages"][1]["content"], "Summarize this");
        assert_eq!(openai["stream"], true);
        assert!(openai.get("temperature").is_none());

        let anthropic = request_body(ProviderKind::Anthropic, &request, &config);
        assert_eq!(anthropic["system"], "You are terse");
        assert_eq!(anthropic["messages"].as_array().unwrap().len(), 1);
        assert_eq!(anthropic["max_tokens"], 1024);

        let google = request_body(ProviderKind::Google, &request, &config);
        assert_eq!(google["systemInstruction"]["parts"][0]["text"], "You are terse");
        assert_eq!(google["contents"][0]["parts"][0]["text"], "Summarize this");
        assert_eq!(google["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_request_body_without_system_prompt() {
        let request = CompletionRequest::new("Hello");
        let config = GenerationConfig::default();

        let openai = request_body(ProviderKind::OpenAI, &request, &config);
        assert_eq!(openai["messages"].as_array().unwrap().len(), 1);
        assert!(openai["temperature"].is_number());

        let google = request_body(ProviderKind::Google, &request, &config);
        assert!(google.get("systemInstruction").is_none());
        assert!(google["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_endpoints() {
        let config = ProviderConfig::new(ProviderKind::Google, "key".to_string());
        let client = ChatClient::new(config).unwrap();
        assert_eq!(
            client.endpoint("gemini-1.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:streamGenerateContent?alt=sse"
        );
        assert_eq!(client.model_id(), "gemini-1.5-flash");
        assert_eq!(client.default_config().model_id, "gemini-1.5-flash");
    }
}
