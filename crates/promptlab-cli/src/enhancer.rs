//! LLM-backed prompt enhancement

use promptlab_core::{
    CompletionRequest, GenerationConfig, LLMProvider, OptimizedPrompt, PromptAnalysis, Result,
    TextStream,
};

const ENHANCER_SYSTEM_PROMPT: &str = "You are an expert prompt engineer. Rewrite the user's prompt so that a \
    language model can answer it precisely. Keep the user's intent, add a clear role, the missing context, \
    an explicit output format and any constraints the task needs. Only output the rewritten prompt, nothing else.";

/// Streams LLM rewrites of prompts, or runs optimized prompts as-is
pub struct PromptEnhancer<L: LLMProvider> {
    llm: L,
}

impl<L: LLMProvider> PromptEnhancer<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Stream an LLM rewrite of `prompt` guided by its analysis
    pub async fn enhance(&self, prompt: &str, analysis: &PromptAnalysis) -> Result<TextStream> {
        let request = build_enhancement_request(prompt, analysis);
        tracing::debug!(model = self.llm.model_id(), "Requesting prompt enhancement");

        self.llm.stream(&request, &self.config(1024)).await
    }

    /// Send an optimized prompt to the model unmodified and stream the answer
    pub async fn run(&self, optimized: &OptimizedPrompt) -> Result<TextStream> {
        let request = build_run_request(optimized);
        self.llm.stream(&request, &self.config(2048)).await
    }

    fn config(&self, max_tokens: u32) -> GenerationConfig {
        GenerationConfig {
            max_tokens,
            ..self.llm.default_config()
        }
    }
}

/// Build the prompt-engineer request listing the analysis findings
pub fn build_enhancement_request(prompt: &str, analysis: &PromptAnalysis) -> CompletionRequest {
    let mut message = format!(
        "Original prompt:\n{}\n\nCategory: {}\nComplexity: {}\nScore: {}/100\n",
        prompt.trim(),
        analysis.category,
        analysis.complexity,
        analysis.score
    );

    if !analysis.issues.is_empty() {
        message.push_str("\nIssues:\n");
        for issue in &analysis.issues {
            message.push_str(&format!("- [{}] {}\n", issue.severity, issue.message));
        }
    }

    if !analysis.missing_elements.is_empty() {
        message.push_str("\nMissing elements:\n");
        for element in &analysis.missing_elements {
            message.push_str(&format!("- {}: {}\n", element.name, element.description));
        }
    }

    message.push_str("\nRewritten prompt:");

    CompletionRequest::new(message).with_system_prompt(ENHANCER_SYSTEM_PROMPT)
}

/// The optimized prompt as a system/user message pair, untouched
pub fn build_run_request(optimized: &OptimizedPrompt) -> CompletionRequest {
    CompletionRequest {
        system_prompt: optimized.system_prompt.clone(),
        prompt: optimized.content.clone(),
    }
}
