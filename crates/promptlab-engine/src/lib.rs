//! Prompt analysis and optimization engine
//!
//! Pure, synchronous heuristics: score a prompt, classify it, detect what it is
//! missing, rebuild it from the user's answers and render the result. Nothing here
//! performs I/O or returns an error.

mod analyzer;
mod export;
mod optimizer;
mod rules;
mod templates;


pub use analyzer::{analyze, estimate_tokens, generate_clarifying_questions, PromptAnalyzer};
pub use export::{export_prompt, ExportFormat};
pub use optimizer::{optimize, optimize_with, OptimizeOptions};
pub use templates::{
    fill_template, find_template, templates, templates_for_category, validate_template_variables,
    FilledTemplate, PromptTemplate, TemplateVariable, ValidationReport, VariableKind,
    VariableValidation,
};

// Re-export the data model for convenience
pub use promptlab_core::{
    Complexity, ContextRequirement, Impact, Importance, Issue, IssueSeverity, MissingElement,
    OptimizationMetadata, OptimizedPrompt, PromptAnalysis, PromptCategory, PromptStructure,
    Suggestion,
};
