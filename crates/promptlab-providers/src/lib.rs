//! Streaming LLM provider relay for promptlab
//!
//! This crate implements the `LLMProvider` trait for OpenAI, Anthropic and Google
//! chat-completion APIs and re-emits their responses as server-sent events.

mod client;
mod config;
pub mod sse;

#[cfg(test)]
mod tests;

pub use client::{parse_event, relay_events, request_body, ChatClient};
pub use config::{ProviderConfig, ProviderKind};

// Re-export core types for convenience
pub use promptlab_core::{
    collect_text, CompletionRequest, Error, GenerationConfig, GenerationResult, LLMProvider,
    Result, StreamEvent, TextStream,
};
