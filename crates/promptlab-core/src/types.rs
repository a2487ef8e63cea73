//! Data model shared by the analyzer, the optimizer and the front ends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task category a prompt belongs to.
///
/// Declaration order matters: category detection breaks ties in favour of the
/// variant declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Coding,
    Writing,
    Analysis,
    Creative,
    Research,
    Business,
    Education,
    Conversation,
    Technical,
    General,
}

impl PromptCategory {
    /// Lower-case identifier, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptCategory::Coding => "coding",
            PromptCategory::Writing => "writing",
            PromptCategory::Analysis => "analysis",
            PromptCategory::Creative => "creative",
            PromptCategory::Research => "research",
            PromptCategory::Business => "business",
            PromptCategory::Education => "education",
            PromptCategory::Conversation => "conversation",
            PromptCategory::Technical => "technical",
            PromptCategory::General => "general",
        }
    }

    /// All categories in declaration order
    pub fn all() -> [PromptCategory; 10] {
        [
            PromptCategory::Coding,
            PromptCategory::Writing,
            PromptCategory::Analysis,
            PromptCategory::Creative,
            PromptCategory::Research,
            PromptCategory::Business,
            PromptCategory::Education,
            PromptCategory::Conversation,
            PromptCategory::Technical,
            PromptCategory::General,
        ]
    }

    /// Parse from a case-insensitive name
    pub fn from_name(name: &str) -> Option<PromptCategory> {
        let name = name.trim().to_lowercase();
        Self::all().into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How demanding a prompt is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    Expert,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
            Complexity::Expert => "expert",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a detected issue; drives the score penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    Warning,
    Suggestion,
}

impl IssueSeverity {
    /// Points subtracted from the score for one issue of this severity
    pub fn penalty(&self) -> i32 {
        match self {
            IssueSeverity::Critical => 25,
            IssueSeverity::Warning => 15,
            IssueSeverity::Suggestion => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Critical => "critical",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A problem found in a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: IssueSeverity,
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    pub priority: u8,
}

/// Expected payoff of applying a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub impact: Impact,
}

/// How much a missing element matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    Important,
    Optional,
}

impl Importance {
    /// Sort weight, higher is more important
    pub fn weight(&self) -> u8 {
        match self {
            Importance::Critical => 3,
            Importance::Important => 2,
            Importance::Optional => 1,
        }
    }

    /// Whether a clarifying question should be asked for this element
    pub fn warrants_question(&self) -> bool {
        matches!(self, Importance::Critical | Importance::Important)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Critical => "critical",
            Importance::Important => "important",
            Importance::Optional => "optional",
        }
    }
}

/// A prompt component the user did not supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingElement {
    pub name: String,
    pub importance: Importance,
    pub description: String,
    pub clarifying_question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Context window pressure implied by the token estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextRequirement {
    Low,
    Medium,
    High,
    Extreme,
}

impl ContextRequirement {
    /// Map a token estimate onto its bucket
    pub fn from_tokens(tokens: usize) -> Self {
        match tokens {
            t if t < 1000 => ContextRequirement::Low,
            t if t < 4000 => ContextRequirement::Medium,
            t if t < 8000 => ContextRequirement::High,
            _ => ContextRequirement::Extreme,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextRequirement::Low => "low",
            ContextRequirement::Medium => "medium",
            ContextRequirement::High => "high",
            ContextRequirement::Extreme => "extreme",
        }
    }
}

/// Result of analyzing one prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptAnalysis {
    pub score: u8,
    pub category: PromptCategory,
    pub complexity: Complexity,
    pub issues: Vec<Issue>,
    pub strengths: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    pub missing_elements: Vec<MissingElement>,
    pub token_estimate: usize,
    pub context_requirement: ContextRequirement,
    pub improvement_potential: u8,
}

/// Semantic parts an optimized prompt was assembled from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptStructure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationMetadata {
    pub original_score: u8,
    pub optimized_score: u8,
    pub token_count: usize,
    /// USD
    pub estimated_cost: f64,
    /// Milliseconds
    pub time_to_optimize: u64,
}

/// A rewritten prompt together with what was changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedPrompt {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub explanation: String,
    pub improvements: Vec<String>,
    pub structure: PromptStructure,
    pub metadata: OptimizationMetadata,
}
