//! Heuristic prompt-quality analyzer

use once_cell::sync::Lazy;
use promptlab_core::{
    Complexity, ContextRequirement, Impact, Importance, Issue, MissingElement, PromptAnalysis,
    PromptCategory, Suggestion,
};

use crate::rules::{
    CATEGORY_KEYWORDS, CONDITIONALS, CONNECTIVES, CONSTRAINT_LANGUAGE, ELEMENT_RULES,
    EXAMPLE_MARKERS, EXPERTISE, ElementRule, ISSUE_RULES, IssueRule, PROCESS, PromptFeatures,
    SECONDARY_SIGNALS, STRENGTH_RULES, StrengthRule,
};

const BASE_SCORE: i32 = 50;
const STRENGTH_BONUS: i32 = 8;
const TOKENS_PER_WORD: f64 = 1.33;
const MAX_QUESTIONS: usize = 3;

static DEFAULT_ANALYZER: Lazy<PromptAnalyzer> = Lazy::new(PromptAnalyzer::new);

/// Analyze a prompt with the built-in rule set
pub fn analyze(prompt: &str) -> PromptAnalysis {
    DEFAULT_ANALYZER.analyze(prompt)
}

/// Questions for the most important missing elements, at most three
pub fn generate_clarifying_questions(analysis: &PromptAnalysis) -> Vec<String> {
    DEFAULT_ANALYZER.clarifying_questions(analysis)
}

/// Approximate LLM token count for a piece of text
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words as f64 * TOKENS_PER_WORD).ceil() as usize
}

/// Rule-driven prompt analyzer.
///
/// Holds the ordered rule lists it evaluates; every call is pure and the analyzer can be
/// shared freely across threads.
pub struct PromptAnalyzer {
    issue_rules: &'static [IssueRule],
    strength_rules: &'static [StrengthRule],
    element_rules: &'static [ElementRule],
}

impl PromptAnalyzer {
    pub fn new() -> Self {
        Self {
            issue_rules: ISSUE_RULES,
            strength_rules: STRENGTH_RULES,
            element_rules: ELEMENT_RULES,
        }
    }

    /// Analyze a prompt. Never fails; degenerate input yields a low score and issues.
    pub fn analyze(&self, prompt: &str) -> PromptAnalysis {
        let mut features = PromptFeatures::new(prompt);
        features.category = self.detect_category(&features.lower);

        let complexity = self.assess_complexity(&features);
        let issues = self.detect_issues(&features);
        let strengths = self.detect_strengths(&features);
        let missing_elements = self.detect_missing_elements(&features);
        let suggestions = self.build_suggestions(&features, complexity, &missing_elements);
        let token_estimate = estimate_tokens(prompt);
        let score = self.calculate_score(&features, &issues, &strengths);

        tracing::debug!(
            category = %features.category,
            complexity = %complexity,
            score,
            issues = issues.len(),
            missing = missing_elements.len(),
            "analyzed prompt"
        );

        PromptAnalysis {
            score,
            category: features.category,
            complexity,
            issues,
            strengths,
            suggestions,
            missing_elements,
            token_estimate,
            context_requirement: ContextRequirement::from_tokens(token_estimate),
            improvement_potential: 100 - score,
        }
    }

    /// Keyword-count classification; ties go to the earlier declared category
    pub fn detect_category(&self, lower: &str) -> PromptCategory {
        let mut best = PromptCategory::General;
        let mut best_total = 0;

        for entry in CATEGORY_KEYWORDS {
            let mut total: usize = entry
                .keywords
                .iter()
                .map(|keyword| lower.matches(keyword).count())
                .sum();

            total += SECONDARY_SIGNALS
                .iter()
                .filter(|signal| signal.category == entry.category)
                .filter(|signal| signal.signals.iter().any(|s| lower.contains(s)))
                .map(|signal| signal.bonus)
                .sum::<usize>();

            if total > best_total {
                best = entry.category;
                best_total = total;
            }
        }

        best
    }

    fn assess_complexity(&self, features: &PromptFeatures) -> Complexity {
        let text = features.text;
        let indicators = [
            features.word_count > 50,
            features.word_count > 100,
            features.sentence_count > 5,
            CONNECTIVES.is_match(text),
            CONDITIONALS.is_match(text),
            EXPERTISE.is_match(text),
            CONSTRAINT_LANGUAGE.is_match(text),
            EXAMPLE_MARKERS.is_match(text),
        ];

        match indicators.iter().filter(|hit| **hit).count() {
            n if n >= 6 => Complexity::Expert,
            n if n >= 4 => Complexity::Complex,
            n if n >= 2 => Complexity::Moderate,
            _ => Complexity::Simple,
        }
    }

    fn detect_issues(&self, features: &PromptFeatures) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .issue_rules
            .iter()
            .filter(|rule| (rule.applies)(features))
            .map(|rule| Issue {
                severity: rule.severity,
                category: rule.category.to_string(),
                message: rule.message.to_string(),
                suggested_fix: Some(rule.suggested_fix.to_string()),
                priority: rule.priority,
            })
            .collect();

        issues.sort_by(|a, b| b.priority.cmp(&a.priority));
        issues
    }

    fn detect_strengths(&self, features: &PromptFeatures) -> Vec<String> {
        self.strength_rules
            .iter()
            .filter(|rule| (rule.applies)(features))
            .map(|rule| rule.strength.to_string())
            .collect()
    }

    fn detect_missing_elements(&self, features: &PromptFeatures) -> Vec<MissingElement> {
        let mut missing: Vec<MissingElement> = self
            .element_rules
            .iter()
            .filter(|rule| (rule.missing)(features))
            .map(|rule| MissingElement {
                name: rule.name.to_string(),
                importance: rule.importance,
                description: rule.description.to_string(),
                clarifying_question: rule.clarifying_question.to_string(),
                example: Some(rule.example.to_string()),
            })
            .collect();

        missing.sort_by(|a, b| b.importance.weight().cmp(&a.importance.weight()));
        missing
    }

    fn build_suggestions(
        &self,
        features: &PromptFeatures,
        complexity: Complexity,
        missing: &[MissingElement],
    ) -> Vec<Suggestion> {
        let mut suggestions: Vec<Suggestion> = missing
            .iter()
            .map(|element| Suggestion {
                kind: element.name.clone(),
                description: element.description.clone(),
                example: element.example.clone(),
                impact: match element.importance {
                    Importance::Critical => Impact::High,
                    Importance::Important => Impact::Medium,
                    Importance::Optional => Impact::Low,
                },
            })
            .collect();

        if complexity >= Complexity::Complex && !PROCESS.is_match(features.text) {
            suggestions.push(Suggestion {
                kind: "decomposition".to_string(),
                description: "Break the request into numbered steps so each part gets addressed"
                    .to_string(),
                example: Some(
                    "1. Summarize the data\n2. Identify trends\n3. Recommend actions".to_string(),
                ),
                impact: Impact::Medium,
            });
        }

        suggestions
    }

    fn calculate_score(&self, features: &PromptFeatures, issues: &[Issue], strengths: &[String]) -> u8 {
        let mut score = BASE_SCORE;

        score += strengths.len() as i32 * STRENGTH_BONUS;
        score -= issues.iter().map(|issue| issue.severity.penalty()).sum::<i32>();

        // Practice bonuses
        if features.length_is_balanced() {
            score += 10;
        }
        for marker in ["example", "format", "you are"] {
            if features.lower.contains(marker) {
                score += 5;
            }
        }

        score.clamp(0, 100) as u8
    }

    /// Questions for critical and important missing elements, at most three
    pub fn clarifying_questions(&self, analysis: &PromptAnalysis) -> Vec<String> {
        analysis
            .missing_elements
            .iter()
            .filter(|element| element.importance.warrants_question())
            .take(MAX_QUESTIONS)
            .map(|element| element.clarifying_question.clone())
            .collect()
    }
}

impl Default for PromptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlab_core::IssueSeverity;

    fn names(analysis: &PromptAnalysis) -> Vec<&str> {
        analysis.missing_elements.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_short_writing_prompt() {
        let analysis = analyze("Write a blog post");

        assert_eq!(analysis.category, PromptCategory::Writing);
        assert_eq!(analysis.complexity, Complexity::Simple);
        assert_eq!(analysis.score, 33);
        assert!(analysis.score < 50);
        assert_eq!(analysis.improvement_potential, 67);
        assert_eq!(analysis.token_estimate, 6);
        assert_eq!(analysis.context_requirement, ContextRequirement::Low);

        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].severity, IssueSeverity::Critical);
        assert_eq!(analysis.issues[0].priority, 10);

        assert_eq!(
            names(&analysis),
            vec!["role", "context", "audience", "format", "examples", "constraints"]
        );
    }

    #[test]
    fn test_well_specified_coding_prompt() {
        let analysis = analyze(
            "You are an expert Python developer. Debug this function: [code]. \
             Format the response as a numbered list. Avoid using external libraries.",
        );

        assert_eq!(analysis.category, PromptCategory::Coding);
        assert!(analysis.strengths.contains(&"Defines a clear role or persona".to_string()));
        assert!(analysis.strengths.contains(&"Specifies the desired output format".to_string()));
        assert!(analysis.strengths.contains(&"Sets explicit constraints".to_string()));

        let missing = names(&analysis);
        assert!(!missing.contains(&"role"));
        assert!(!missing.contains(&"format"));
        assert!(!missing.contains(&"constraints"));

        // 50 + 4 strengths - no clear task + length, "format" and "you are" bonuses
        assert_eq!(analysis.score, 77);
    }

    #[test]
    fn test_empty_prompt_is_data_not_error() {
        let analysis = analyze("");

        assert_eq!(analysis.score, 0);
        assert_eq!(analysis.improvement_potential, 100);
        assert_eq!(analysis.token_estimate, 0);
        assert_eq!(analysis.category, PromptCategory::General);

        let priorities: Vec<u8> = analysis.issues.iter().map(|i| i.priority).collect();
        assert_eq!(priorities, vec![10, 9]);
        assert!(analysis
            .issues
            .iter()
            .all(|i| i.severity == IssueSeverity::Critical));
    }

    #[test]
    fn test_question_mark_counts_as_task() {
        let analysis = analyze("What are the main causes of inflation in 2024?");
        assert!(analysis.issues.iter().all(|i| i.category != "task"));
    }

    #[test]
    fn test_category_tie_prefers_declaration_order() {
        let analyzer = PromptAnalyzer::new();
        assert_eq!(analyzer.detect_category("write code"), PromptCategory::Coding);
        assert_eq!(analyzer.detect_category("hello there"), PromptCategory::General);
    }

    #[test]
    fn test_secondary_signals() {
        let analyzer = PromptAnalyzer::new();
        assert_eq!(
            analyzer.detect_category("explain how photosynthesis works to students"),
            PromptCategory::Education
        );
        assert_eq!(
            analyzer.detect_category("let's chat about your favorite movies?"),
            PromptCategory::Conversation
        );
    }

    #[test]
    fn test_conversation_skips_most_elements() {
        let analysis = analyze("Let's chat about your favorite movies?");
        assert_eq!(analysis.category, PromptCategory::Conversation);
        assert_eq!(names(&analysis), vec!["context"]);
    }

    #[test]
    fn test_education_requires_audience_unless_mentioned() {
        let analysis = analyze("Explain how photosynthesis works to students");
        assert_eq!(analysis.category, PromptCategory::Education);
        assert!(!names(&analysis).contains(&"audience"));

        let analysis = analyze("Explain how photosynthesis works in a lesson");
        assert!(names(&analysis).contains(&"audience"));
    }

    #[test]
    fn test_complexity_levels() {
        assert_eq!(analyze("Write a poem").complexity, Complexity::Simple);

        let moderate = analyze("Write a poem and make it rhyme if possible");
        assert_eq!(moderate.complexity, Complexity::Moderate);

        let filler = "word ".repeat(120);
        let expert = analyze(&format!(
            "{filler} and if you are an expert you must follow this example"
        ));
        assert_eq!(expert.complexity, Complexity::Expert);
    }

    #[test]
    fn test_vague_and_multi_task_issues() {
        let analysis = analyze(
            "Write something nice and then also translate it, additionally add a title, \
             furthermore format it",
        );
        let messages: Vec<&str> = analysis.issues.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(messages, vec!["clarity", "focus"]);
        assert_eq!(analysis.issues[1].severity, IssueSeverity::Suggestion);
    }

    #[test]
    fn test_long_unstructured_prompt() {
        let body = "analyze the quarterly numbers carefully ".repeat(45);
        let analysis = analyze(&format!("Analyze {body}"));

        let categories: Vec<&str> = analysis.issues.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(categories, vec!["structure", "context"]);

        let structured = analyze(&format!("Analyze for the board:\n- {body}"));
        assert!(structured.issues.is_empty());
    }

    #[test]
    fn test_token_estimate_rule() {
        for prompt in ["", "one", "one two three", &"word ".repeat(77)] {
            let words = prompt.split_whitespace().count();
            let analysis = analyze(prompt);
            assert_eq!(analysis.token_estimate, (words as f64 * 1.33).ceil() as usize);
        }
        assert_eq!(estimate_tokens(&"word ".repeat(100)), 133);
    }

    #[test]
    fn test_determinism_and_bounds() {
        let prompts = [
            "",
            "?",
            "Write a blog post",
            "You are a helpful assistant. Help me with something good, nice and better stuff.",
            &"You are an expert. Use this example format. ".repeat(30),
        ];

        for prompt in prompts {
            let first = analyze(prompt);
            let second = analyze(prompt);
            assert_eq!(first, second);
            assert!(first.score <= 100);
            assert_eq!(first.improvement_potential, 100 - first.score);
        }
    }

    #[test]
    fn test_high_scores_clamp_at_100() {
        let prompt = "Create a step-by-step guide for beginners. You are an expert teacher. \
                      Use this example as background context. Format the output as a list. \
                      Avoid jargon and ensure each step is short, for instance under two lines.";
        let analysis = analyze(prompt);
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.improvement_potential, 0);
    }

    #[test]
    fn test_clarifying_questions_cap() {
        let analysis = analyze("Write a blog post");
        let questions = generate_clarifying_questions(&analysis);

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0], analysis.missing_elements[0].clarifying_question);
        assert!(questions.iter().all(|q| q.ends_with('?')));

        let coding = analyze("Debug this function and format it as a list, avoid globals");
        let important = coding
            .missing_elements
            .iter()
            .filter(|m| m.importance.warrants_question())
            .count();
        assert!(generate_clarifying_questions(&coding).len() <= important.min(3));
    }

    #[test]
    fn test_suggestions_mirror_missing_elements() {
        let analysis = analyze("Write a blog post");
        assert_eq!(analysis.suggestions.len(), analysis.missing_elements.len());
        assert_eq!(analysis.suggestions[0].kind, "role");
        assert_eq!(analysis.suggestions[0].impact, Impact::Medium);
        assert_eq!(analysis.suggestions[5].impact, Impact::Low);
    }
}
