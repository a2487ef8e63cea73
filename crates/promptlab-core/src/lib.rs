//! Core traits and types for promptlab
//!
//! This crate defines the data model produced by the prompt analyzer and optimizer,
//! the shared error type, and the streaming interface that LLM provider relays
//! implement.

pub mod error;
pub mod llm;
pub mod types;

pub use error::{Error, Result};
pub use llm::{
    collect_text, CompletionRequest, GenerationConfig, GenerationResult, LLMProvider,
    StreamEvent, TextStream,
};
pub use types::*;
