//! Rendering of optimized prompts for the clipboard / file sinks

use std::fmt;
use std::str::FromStr;

use promptlab_core::{Error, OptimizedPrompt};

const NOT_SPECIFIED: &str = "Not specified";

/// Output format for [`export_prompt`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
    Text,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(Error::InvalidInput(format!(
                "Unknown export format '{}', expected markdown, json or text",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render an optimized prompt. Never fails; absent fields render as "Not specified".
pub fn export_prompt(optimized: &OptimizedPrompt, format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(optimized).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize optimized prompt: {}", e);
            String::from("{}")
        }),
        ExportFormat::Text => match &optimized.system_prompt {
            Some(system_prompt) => format!("{}\n\n{}", system_prompt, optimized.content),
            None => optimized.content.clone(),
        },
        ExportFormat::Markdown => render_markdown(optimized),
    }
}

fn render_markdown(optimized: &OptimizedPrompt) -> String {
    let structure = &optimized.structure;
    let metadata = &optimized.metadata;

    let improvements = if optimized.improvements.is_empty() {
        "- None".to_string()
    } else {
        optimized
            .improvements
            .iter()
            .map(|improvement| format!("- {}", improvement))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let list = |value: &Option<Vec<String>>, separator: &str| match value {
        Some(items) if !items.is_empty() => items.join(separator),
        _ => NOT_SPECIFIED.to_string(),
    };

    let mut out = String::new();
    out.push_str("# Optimized Prompt\n\n");
    out.push_str(&format!("## System Prompt\n\n{}\n\n", text(&optimized.system_prompt)));
    out.push_str(&format!("## Prompt\n\n{}\n\n", optimized.content));
    out.push_str("## Scores\n\n");
    out.push_str(&format!("- Original score: {}/100\n", metadata.original_score));
    out.push_str(&format!("- Optimized score: {}/100\n", metadata.optimized_score));
    out.push_str(&format!("- Token count: {}\n\n", metadata.token_count));
    out.push_str(&format!("## Improvements\n\n{}\n\n", improvements));
    out.push_str(&format!("## Explanation\n\n{}\n\n", optimized.explanation));
    out.push_str("## Structure\n\n");
    out.push_str(&format!("- **Role:** {}\n", text(&structure.role)));
    out.push_str(&format!("- **Context:** {}\n", text(&structure.context)));
    out.push_str(&format!("- **Task:** {}\n", structure.task));
    out.push_str(&format!("- **Constraints:** {}\n", list(&structure.constraints, ", ")));
    out.push_str(&format!("- **Format:** {}\n", text(&structure.format)));
    out.push_str(&format!("- **Examples:** {}\n", list(&structure.examples, "; ")));
    out.push_str(&format!("- **Audience:** {}\n", text(&structure.audience)));
    out
}
