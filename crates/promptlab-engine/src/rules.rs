//! Static knowledge base for the analyzer: category keyword tables, marker patterns
//! and the ordered issue, strength and missing-element rule lists.

use once_cell::sync::Lazy;
use promptlab_core::{Importance, IssueSeverity, PromptCategory};
use regex::Regex;

/// Representative keywords for one category, matched as plain substrings
pub(crate) struct CategoryKeywords {
    pub category: PromptCategory,
    pub keywords: &'static [&'static str],
}

/// Fixed bonus added to a category when any of its signals appears
pub(crate) struct SecondarySignal {
    pub category: PromptCategory,
    pub signals: &'static [&'static str],
    pub bonus: usize,
}

/// Declaration order is the tie-break order.
pub(crate) const CATEGORY_KEYWORDS: &[CategoryKeywords] = &[
    CategoryKeywords {
        category: PromptCategory::Coding,
        keywords: &[
            "code", "program", "function", "debug", "algorithm", "script", "api", "bug",
            "python", "javascript", "typescript", "sql", "compile", "refactor",
        ],
    },
    CategoryKeywords {
        category: PromptCategory::Writing,
        keywords: &[
            "write", "essay", "article", "blog", "draft", "email", "letter", "copy",
            "proofread", "headline",
        ],
    },
    CategoryKeywords {
        category: PromptCategory::Analysis,
        keywords: &[
            "analyze", "analyse", "analysis", "compare", "evaluate", "assess", "data",
            "insight", "trend", "metric", "statistic",
        ],
    },
    CategoryKeywords {
        category: PromptCategory::Creative,
        keywords: &[
            "creative", "story", "poem", "poetry", "fiction", "imagine", "novel",
            "character", "brainstorm", "song",
        ],
    },
    CategoryKeywords {
        category: PromptCategory::Research,
        keywords: &[
            "research", "study", "studies", "investigate", "source", "citation",
            "literature", "paper", "evidence", "survey",
        ],
    },
    CategoryKeywords {
        category: PromptCategory::Business,
        keywords: &[
            "business", "marketing", "strategy", "sales", "customer", "revenue", "market",
            "startup", "pitch", "stakeholder",
        ],
    },
    CategoryKeywords {
        category: PromptCategory::Education,
        keywords: &[
            "teach", "learn", "student", "lesson", "course", "tutorial", "curriculum",
            "quiz", "homework", "education",
        ],
    },
    CategoryKeywords {
        category: PromptCategory::Conversation,
        keywords: &["dialogue", "discuss", "roleplay", "reply", "respond to"],
    },
    CategoryKeywords {
        category: PromptCategory::Technical,
        keywords: &[
            "technical", "documentation", "architecture", "system", "infrastructure",
            "deploy", "configure", "server", "network", "database",
        ],
    },
];

pub(crate) const SECONDARY_SIGNALS: &[SecondarySignal] = &[
    SecondarySignal {
        category: PromptCategory::Education,
        signals: &["explain", "how to"],
        bonus: 2,
    },
    SecondarySignal {
        category: PromptCategory::Conversation,
        signals: &["chat", "talk", "conversation"],
        bonus: 2,
    },
    SecondarySignal {
        category: PromptCategory::Technical,
        signals: &["technical", "documentation"],
        bonus: 2,
    },
];

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("static pattern must compile")
}

pub(crate) static CONNECTIVES: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:and|also|additionally|furthermore|then|next|after)\b"));
pub(crate) static CONDITIONALS: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:if|when|unless|provided|given|assuming)\b"));
pub(crate) static EXPERTISE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:expert|advanced|professional|technical|specialized)\b"));
pub(crate) static CONSTRAINT_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\b(?:must|should|need to|require|ensure|avoid|don['’]t|never)\b")
});
pub(crate) static EXAMPLE_MARKERS: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\b(?:example|examples|instance|like|such as)\b|\be\.g\.")
});
pub(crate) static IMPERATIVE_START: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)^\s*(?:create|write|analyze|explain|generate|build|make|design|help)\b")
});
pub(crate) static VAGUE_WORDS: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\b(?:something|anything|stuff|things|good|nice|better)\b")
});
pub(crate) static MULTI_TASK: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:and then|also|additionally|furthermore)\b"));
pub(crate) static CONTEXT_CUES: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:context|background|for)\b"));
pub(crate) static BACKGROUND: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:context|background)\b"));
pub(crate) static FORMAT_MARKERS: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:format|formatted|structure|structured|list|paragraphs?|table|json|markdown|bullets?|outline)\b",
    )
});
pub(crate) static NEGATIVE_CONSTRAINTS: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\bdon['’]t\b|\b(?:avoid|must|ensure)\b"));
pub(crate) static CONSTRAINT_CUES: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)\bdon['’]t\b|\b(?:do not|must|should|avoid|never|only|limit|without)\b")
});
pub(crate) static AUDIENCE: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\b(?:audience|readers?|users?|beginners?|students?|customers?|stakeholders?|clients?|non-technical)\b",
    )
});
pub(crate) static PROCESS: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:step|steps|process|method|methodology|approach)\b"));
pub(crate) static ROLE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b(?:you are|act as|as a)\b"));
pub(crate) static LIST_LINE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?m)^\s*(?:[-*•]|\d+[.)])\s"));

/// Facts about a prompt computed once and shared by every rule
pub(crate) struct PromptFeatures<'a> {
    pub text: &'a str,
    pub lower: String,
    pub word_count: usize,
    pub sentence_count: usize,
    pub category: PromptCategory,
}

impl<'a> PromptFeatures<'a> {
    pub fn new(text: &'a str) -> Self {
        let lower = text.to_lowercase();
        let word_count = text.split_whitespace().count();
        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();

        Self {
            text,
            lower,
            word_count,
            sentence_count,
            category: PromptCategory::General,
        }
    }

    pub fn starts_with_imperative(&self) -> bool {
        IMPERATIVE_START.is_match(self.text)
    }

    pub fn has_structure(&self) -> bool {
        self.text.contains('\n') || LIST_LINE.is_match(self.text)
    }

    pub fn length_is_balanced(&self) -> bool {
        (20..=150).contains(&self.word_count)
    }
}

pub(crate) struct IssueRule {
    pub severity: IssueSeverity,
    pub category: &'static str,
    pub message: &'static str,
    pub suggested_fix: &'static str,
    pub priority: u8,
    pub applies: fn(&PromptFeatures) -> bool,
}

pub(crate) const ISSUE_RULES: &[IssueRule] = &[
    IssueRule {
        severity: IssueSeverity::Critical,
        category: "length",
        message: "Prompt is too short to convey a clear task",
        suggested_fix: "Add detail about what you need, the context and the expected result",
        priority: 10,
        applies: |f| f.word_count < 5,
    },
    IssueRule {
        severity: IssueSeverity::Warning,
        category: "structure",
        message: "Long prompt lacks structure",
        suggested_fix: "Break the prompt into sections, bullet points or numbered steps",
        priority: 7,
        applies: |f| f.word_count > 200 && !f.has_structure(),
    },
    IssueRule {
        severity: IssueSeverity::Warning,
        category: "clarity",
        message: "Prompt uses vague language",
        suggested_fix: "Replace words like 'something' or 'good' with specific requirements",
        priority: 6,
        applies: |f| VAGUE_WORDS.is_match(f.text),
    },
    IssueRule {
        severity: IssueSeverity::Critical,
        category: "task",
        message: "No clear task or instruction",
        suggested_fix: "Start with an action verb such as 'Write', 'Analyze' or 'Create', or ask a direct question",
        priority: 9,
        applies: |f| !f.starts_with_imperative() && !f.text.contains('?'),
    },
    IssueRule {
        severity: IssueSeverity::Suggestion,
        category: "focus",
        message: "Prompt combines multiple unrelated tasks",
        suggested_fix: "Split unrelated tasks into separate prompts or number them",
        priority: 4,
        applies: |f| MULTI_TASK.find_iter(f.text).count() > 2,
    },
    IssueRule {
        severity: IssueSeverity::Warning,
        category: "context",
        message: "Prompt lacks background context",
        suggested_fix: "Explain the situation, the purpose, or who the output is for",
        priority: 5,
        applies: |f| f.word_count > 50 && !CONTEXT_CUES.is_match(f.text),
    },
];

pub(crate) struct StrengthRule {
    pub strength: &'static str,
    pub applies: fn(&PromptFeatures) -> bool,
}

pub(crate) const STRENGTH_RULES: &[StrengthRule] = &[
    StrengthRule {
        strength: "Defines a clear role or persona",
        applies: |f| ROLE.is_match(f.text),
    },
    StrengthRule {
        strength: "Starts with a clear action verb",
        applies: |f| f.starts_with_imperative(),
    },
    StrengthRule {
        strength: "Includes examples or references",
        applies: |f| EXAMPLE_MARKERS.is_match(f.text),
    },
    StrengthRule {
        strength: "Specifies the desired output format",
        applies: |f| FORMAT_MARKERS.is_match(f.text),
    },
    StrengthRule {
        strength: "Sets explicit constraints",
        applies: |f| NEGATIVE_CONSTRAINTS.is_match(f.text),
    },
    StrengthRule {
        strength: "Identifies the target audience",
        applies: |f| AUDIENCE.is_match(f.text),
    },
    StrengthRule {
        strength: "Asks for a step-by-step approach",
        applies: |f| PROCESS.is_match(f.text),
    },
    StrengthRule {
        strength: "Has an appropriate level of detail",
        applies: |f| f.length_is_balanced(),
    },
    StrengthRule {
        strength: "Provides background context",
        applies: |f| BACKGROUND.is_match(f.text),
    },
];

pub(crate) struct ElementRule {
    pub name: &'static str,
    pub importance: Importance,
    pub description: &'static str,
    pub clarifying_question: &'static str,
    pub example: &'static str,
    pub missing: fn(&PromptFeatures) -> bool,
}

pub(crate) const ELEMENT_RULES: &[ElementRule] = &[
    ElementRule {
        name: "role",
        importance: Importance::Important,
        description: "Who the AI should act as",
        clarifying_question: "What role or expertise should the AI take on (for example, a senior software engineer or a marketing strategist)?",
        example: "You are an experienced data scientist",
        missing: |f| !ROLE.is_match(f.text) && f.category != PromptCategory::Conversation,
    },
    ElementRule {
        name: "context",
        importance: Importance::Important,
        description: "Background on the situation and the goal",
        clarifying_question: "What background or context should the AI know about your situation?",
        example: "I'm preparing a quarterly report for the executive team",
        missing: |f| f.word_count < 30 && !BACKGROUND.is_match(f.text),
    },
    ElementRule {
        name: "format",
        importance: Importance::Optional,
        description: "The structure the response should follow",
        clarifying_question: "How should the response be formatted (for example, bullet points, a table or paragraphs)?",
        example: "Respond with a numbered list",
        missing: |f| !FORMAT_MARKERS.is_match(f.text) && f.category != PromptCategory::Conversation,
    },
    ElementRule {
        name: "audience",
        importance: Importance::Important,
        description: "Who the output is written for",
        clarifying_question: "Who is the intended audience for this output?",
        example: "Non-technical stakeholders",
        missing: |f| {
            !AUDIENCE.is_match(f.text)
                && matches!(
                    f.category,
                    PromptCategory::Writing | PromptCategory::Education | PromptCategory::Business
                )
        },
    },
    ElementRule {
        name: "examples",
        importance: Importance::Optional,
        description: "Examples of the expected output",
        clarifying_question: "Can you share an example of the output you expect?",
        example: "Something in the style of: 'Q3 revenue grew 12%, driven by...'",
        missing: |f| !EXAMPLE_MARKERS.is_match(f.text) && f.category != PromptCategory::Conversation,
    },
    ElementRule {
        name: "constraints",
        importance: Importance::Optional,
        description: "Limits and requirements the response must respect",
        clarifying_question: "Are there any constraints or requirements, such as length, tone or things to avoid?",
        example: "Keep it under 300 words and avoid jargon",
        missing: |f| !CONSTRAINT_CUES.is_match(f.text) && f.category != PromptCategory::Conversation,
    },
];
