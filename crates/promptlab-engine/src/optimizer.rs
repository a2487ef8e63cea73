//! Rule-based prompt optimizer

use std::collections::HashMap;
use std::time::Instant;

use promptlab_core::{
    IssueSeverity, OptimizationMetadata, OptimizedPrompt, PromptAnalysis, PromptStructure,
};

use crate::analyzer::estimate_tokens;

const SCORE_BONUS: u8 = 30;
const SECTION_SEPARATOR: &str = "\n\n";
/// USD per 1K tokens
const COST_PER_1K_TOKENS: f64 = 0.002;

/// Answer keys understood by the optimizer and the improvement each one records
const ANSWER_IMPROVEMENTS: [(&str, &str); 6] = [
    ("role", "Added role definition for better context"),
    ("context", "Provided background context"),
    ("format", "Specified output format"),
    ("constraints", "Added requirements and constraints"),
    ("examples", "Included examples for clarity"),
    ("audience", "Defined target audience"),
];

/// Options controlling how the optimized prompt is assembled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// The caller sends `system_prompt` through a separate system message, so the role
    /// is left out of `content`.
    pub system_prompt_channel: bool,
}

/// Optimize with default options (role stays inline in `content`)
pub fn optimize(
    original_prompt: &str,
    analysis: &PromptAnalysis,
    responses: &HashMap<String, String>,
) -> OptimizedPrompt {
    optimize_with(original_prompt, analysis, responses, &OptimizeOptions::default())
}

/// Rebuild a prompt from the original text and the user's answers.
///
/// Deterministic apart from `metadata.time_to_optimize`. Blank answers count as absent.
pub fn optimize_with(
    original_prompt: &str,
    analysis: &PromptAnalysis,
    responses: &HashMap<String, String>,
    options: &OptimizeOptions,
) -> OptimizedPrompt {
    let started = Instant::now();
    let answer = |key: &str| {
        responses
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    };

    let system_prompt = answer("role").map(join_role_fragments);
    let constraints = answer("constraints").map(split_constraints);
    let examples = answer("examples").map(split_examples);

    let structure = PromptStructure {
        role: system_prompt.clone(),
        context: answer("context").map(str::to_string),
        task: original_prompt.to_string(),
        constraints: constraints.clone(),
        format: answer("format").map(str::to_string),
        examples,
        audience: answer("audience").map(str::to_string),
    };

    let mut sections: Vec<String> = Vec::new();
    if let Some(role) = &structure.role {
        if !options.system_prompt_channel {
            sections.push(format!("Role: {role}"));
        }
    }
    if let Some(context) = &structure.context {
        sections.push(format!("Context: {context}"));
    }
    sections.push(format!("Task: {original_prompt}"));
    if let Some(format) = &structure.format {
        sections.push(format!("Format: {format}"));
    }
    if let Some(constraints) = &constraints {
        sections.push(format!("Requirements: {}", constraints.join(", ")));
    }
    if let Some(examples) = answer("examples") {
        sections.push(format!("Examples: {examples}"));
    }
    if let Some(audience) = &structure.audience {
        sections.push(format!("Target audience: {audience}"));
    }

    let content = sections.join(SECTION_SEPARATOR);

    let mut improvements: Vec<String> = ANSWER_IMPROVEMENTS
        .into_iter()
        .filter(|&(key, _)| answer(key).is_some())
        .map(|(_, improvement)| improvement.to_string())
        .collect();
    improvements.extend(
        analysis
            .issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Critical)
            .map(|issue| format!("Fixed critical issue: {}", issue.message)),
    );

    // Counts come from the original analysis, not from what the answers resolved.
    let explanation = format!(
        "Improved prompt by adding {} missing elements and addressing {} issues",
        analysis.missing_elements.len(),
        analysis.issues.len()
    );

    let token_count = estimate_tokens(&content);
    let metadata = OptimizationMetadata {
        original_score: analysis.score,
        optimized_score: analysis.score.saturating_add(SCORE_BONUS).min(100),
        token_count,
        estimated_cost: token_count as f64 * COST_PER_1K_TOKENS / 1000.0,
        time_to_optimize: started.elapsed().as_millis() as u64,
    };

    tracing::debug!(
        answered = improvements.len(),
        token_count,
        optimized_score = metadata.optimized_score,
        "optimized prompt"
    );

    OptimizedPrompt {
        content,
        system_prompt,
        explanation,
        improvements,
        structure,
        metadata,
    }
}

fn join_role_fragments(role: &str) -> String {
    role.split(['\n', ';'])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

fn split_constraints(constraints: &str) -> Vec<String> {
    constraints
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_examples(examples: &str) -> Vec<String> {
    examples
        .lines()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
