//! Named prompt templates with `{{variable}}` placeholders.
//!
//! Every template declares the variables it accepts; that declaration is the schema
//! [`validate_template_variables`] checks user input against.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use promptlab_core::PromptCategory;
use regex::Regex;
use serde::Serialize;

/// Type of value a template variable accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "options")]
pub enum VariableKind {
    Text,
    Number,
    Select(Vec<&'static str>),
}

/// Declared constraints on a variable's value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableValidation {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateVariable {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: VariableKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub validation: VariableValidation,
}

impl TemplateVariable {
    fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind: VariableKind::Text,
            required: false,
            default: None,
            validation: VariableValidation::default(),
        }
    }

    fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            kind: VariableKind::Number,
            ..Self::text(name, description)
        }
    }

    fn select(name: &'static str, description: &'static str, options: &[&'static str]) -> Self {
        Self {
            kind: VariableKind::Select(options.to_vec()),
            ..Self::text(name, description)
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.validation.min_length = min;
        self.validation.max_length = max;
        self
    }

    fn pattern(mut self, pattern: &'static str) -> Self {
        self.validation.pattern = Some(pattern);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub category: PromptCategory,
    pub description: &'static str,
    pub template: &'static str,
    pub system_prompt: Option<&'static str>,
    pub variables: Vec<TemplateVariable>,
}

/// A template with its placeholders substituted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledTemplate {
    pub prompt: String,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

static CATALOG: Lazy<Vec<PromptTemplate>> = Lazy::new(|| {
    vec![
        PromptTemplate {
            id: "code-review",
            name: "Code Review",
            category: PromptCategory::Coding,
            description: "Structured review of a code snippet",
            template: "Review the following {{language}} code with a focus on {{focus}}.\n\n\
                       ```{{language}}\n{{code}}\n```\n\n\
                       List each issue with its severity, explain why it matters and suggest a concrete fix.",
            system_prompt: Some("You are a senior {{language}} engineer performing a thorough code review."),
            variables: vec![
                TemplateVariable::text("language", "Programming language of the snippet")
                    .required()
                    .length(None, Some(30))
                    .pattern(r"^[A-Za-z+#. ]+$"),
                TemplateVariable::text("code", "The code to review")
                    .required()
                    .length(Some(10), None),
                TemplateVariable::select(
                    "focus",
                    "Primary review focus",
                    &["correctness", "performance", "security", "readability"],
                )
                .default_value("correctness"),
            ],
        },
        PromptTemplate {
            id: "blog-post",
            name: "Blog Post",
            category: PromptCategory::Writing,
            description: "Long-form article for a defined audience",
            template: "Write a {{length}}-word blog post about {{topic}} for {{audience}}. \
                       Use a {{tone}} tone, open with an engaging introduction, use clear subheadings \
                       and finish with a call to action.",
            system_prompt: Some("You are an experienced content writer who produces clear, well-structured articles."),
            variables: vec![
                TemplateVariable::text("topic", "What the post is about")
                    .required()
                    .length(Some(3), Some(200)),
                TemplateVariable::text("audience", "Who the post is for").required(),
                TemplateVariable::select(
                    "tone",
                    "Voice of the post",
                    &["professional", "casual", "friendly", "authoritative"],
                )
                .default_value("professional"),
                TemplateVariable::number("length", "Target length in words").default_value("800"),
            ],
        },
        PromptTemplate {
            id: "data-analysis",
            name: "Data Analysis",
            category: PromptCategory::Analysis,
            description: "Answer a question from a dataset and report the findings",
            template: "Analyze the following {{data_type}} data to answer: {{question}}\n\n\
                       Data:\n{{data}}\n\n\
                       Describe the key trends, notable outliers and the limitations of the analysis. \
                       Present the findings as {{output_format}}.",
            system_prompt: Some("You are a meticulous data analyst who explains findings in plain language."),
            variables: vec![
                TemplateVariable::text("data_type", "Kind of data").default_value("tabular"),
                TemplateVariable::text("question", "The question to answer")
                    .required()
                    .length(Some(10), None),
                TemplateVariable::text("data", "The data itself").required(),
                TemplateVariable::select(
                    "output_format",
                    "Shape of the findings",
                    &["bullet points", "a table", "a short report"],
                )
                .default_value("bullet points"),
            ],
        },
        PromptTemplate {
            id: "short-story",
            name: "Short Story",
            category: PromptCategory::Creative,
            description: "Genre fiction around a protagonist and a theme",
            template: "Write a {{genre}} short story of about {{word_count}} words featuring {{protagonist}}. \
                       The story should explore the theme of {{theme}} and end with {{ending}}.",
            system_prompt: Some("You are an award-winning fiction author."),
            variables: vec![
                TemplateVariable::select(
                    "genre",
                    "Story genre",
                    &["fantasy", "science fiction", "mystery", "romance", "literary"],
                )
                .required(),
                TemplateVariable::number("word_count", "Approximate length in words")
                    .default_value("1000"),
                TemplateVariable::text("protagonist", "Main character").required(),
                TemplateVariable::text("theme", "Central theme").required(),
                TemplateVariable::text("ending", "How the story ends")
                    .default_value("an unexpected twist"),
            ],
        },
        PromptTemplate {
            id: "literature-review",
            name: "Literature Review",
            category: PromptCategory::Research,
            description: "Thematic summary of published research",
            template: "Summarize the current research on {{topic}} published since {{since_year}}. \
                       Group the findings by theme, note where studies disagree and list open questions. \
                       Cite sources in {{citation_style}} style.",
            system_prompt: Some("You are a research assistant with expertise in systematic literature reviews."),
            variables: vec![
                TemplateVariable::text("topic", "Research topic")
                    .required()
                    .length(Some(3), None),
                TemplateVariable::number("since_year", "Earliest publication year")
                    .default_value("2015")
                    .pattern(r"^\d{4}$"),
                TemplateVariable::select(
                    "citation_style",
                    "Citation style",
                    &["APA", "MLA", "Chicago", "IEEE"],
                )
                .default_value("APA"),
            ],
        },
        PromptTemplate {
            id: "marketing-email",
            name: "Marketing Email",
            category: PromptCategory::Business,
            description: "Product announcement email for a customer segment",
            template: "Write a marketing email announcing {{product}} to {{segment}}. \
                       Highlight these benefits: {{benefits}}. Keep it under {{max_words}} words \
                       and close with this call to action: {{cta}}.",
            system_prompt: Some("You are a conversion-focused email marketer."),
            variables: vec![
                TemplateVariable::text("product", "Product or feature being announced").required(),
                TemplateVariable::text("segment", "Customer segment receiving the email").required(),
                TemplateVariable::text("benefits", "Key benefits, comma separated").required(),
                TemplateVariable::number("max_words", "Word limit").default_value("200"),
                TemplateVariable::text("cta", "Call to action")
                    .required()
                    .length(None, Some(80)),
            ],
        },
    ]
});

/// The built-in template catalog
pub fn templates() -> &'static [PromptTemplate] {
    &CATALOG
}

pub fn find_template(id: &str) -> Option<&'static PromptTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

pub fn templates_for_category(category: PromptCategory) -> Vec<&'static PromptTemplate> {
    CATALOG.iter().filter(|t| t.category == category).collect()
}

fn placeholder(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// Substitute `{{name}}` tokens literally.
///
/// Supplied variables are applied in name order; declared variables that were not
/// supplied, or were supplied blank, fall back to their default. Unknown tokens stay
/// in place.
pub fn fill_template(template: &PromptTemplate, variables: &HashMap<String, String>) -> FilledTemplate {
    let mut prompt = template.template.to_string();
    let mut system_prompt = template.system_prompt.map(str::to_string);

    let supplied = |name: &str| variables.get(name).is_some_and(|value| !value.trim().is_empty());

    let mut substitutions: Vec<(&str, &str)> = variables
        .iter()
        .filter(|(name, _)| supplied(name))
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    substitutions.sort_by(|a, b| a.0.cmp(b.0));
    substitutions.extend(
        template
            .variables
            .iter()
            .filter(|v| !supplied(v.name))
            .filter_map(|v| v.default.map(|default| (v.name, default))),
    );

    for (name, value) in substitutions {
        let token = placeholder(name);
        prompt = prompt.replace(&token, value);
        if let Some(system) = system_prompt.as_mut() {
            *system = system.replace(&token, value);
        }
    }

    FilledTemplate {
        prompt,
        system_prompt,
    }
}

/// Check supplied values against the template's declared variables.
///
/// Failures are collected as readable messages; an empty list means valid.
pub fn validate_template_variables(
    template: &PromptTemplate,
    variables: &HashMap<String, String>,
) -> ValidationReport {
    let mut errors = Vec::new();

    for variable in &template.variables {
        let value = variables
            .get(variable.name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        let Some(value) = value else {
            if variable.required && variable.default.is_none() {
                errors.push(format!("{} is required", variable.name));
            }
            continue;
        };

        match &variable.kind {
            VariableKind::Text => {}
            VariableKind::Number => {
                if value.parse::<f64>().is_err() {
                    errors.push(format!("{} must be a number", variable.name));
                }
            }
            VariableKind::Select(options) => {
                if !options.iter().any(|option| option.eq_ignore_ascii_case(value)) {
                    errors.push(format!(
                        "{} must be one of: {}",
                        variable.name,
                        options.join(", ")
                    ));
                }
            }
        }

        let length = value.chars().count();
        let rules = &variable.validation;
        if let Some(min) = rules.min_length {
            if length < min {
                errors.push(format!("{} must be at least {} characters", variable.name, min));
            }
        }
        if let Some(max) = rules.max_length {
            if length > max {
                errors.push(format!("{} must be at most {} characters", variable.name, max));
            }
        }
        if let Some(pattern) = rules.pattern {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(value) => {
                    errors.push(format!("{} has an invalid format", variable.name));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Invalid validation pattern for {}: {}", variable.name, e);
                    errors.push(format!("{} has an invalid validation pattern", variable.name));
                }
            }
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_catalog_shape() {
        assert_eq!(templates().len(), 6);
        assert!(find_template("code-review").is_some());
        assert!(find_template("missing").is_none());
        assert_eq!(templates_for_category(PromptCategory::Business).len(), 1);
        assert!(templates_for_category(PromptCategory::Conversation).is_empty());

        for template in templates() {
            for variable in &template.variables {
                assert!(
                    template.template.contains(&placeholder(variable.name)),
                    "{} does not use {}",
                    template.id,
                    variable.name
                );
            }
        }
    }

    #[test]
    fn test_fill_applies_values_and_defaults() {
        let template = find_template("code-review").unwrap();
        let filled = fill_template(
            template,
            &vars(&[("language", "Rust"), ("code", "fn main() {}")]),
        );

        assert!(filled.prompt.starts_with("Review the following Rust code with a focus on correctness."));
        assert!(filled.prompt.contains("```Rust\nfn main() {}\n```"));
        assert_eq!(
            filled.system_prompt.as_deref(),
            Some("You are a senior Rust engineer performing a thorough code review.")
        );
    }

    #[test]
    fn test_blank_value_falls_back_to_default() {
        let template = find_template("code-review").unwrap();
        let variables = vars(&[
            ("language", "Rust"),
            ("code", "fn main() { println!(); }"),
            ("focus", "   "),
        ]);

        let report = validate_template_variables(template, &variables);
        assert!(report.is_valid);

        let filled = fill_template(template, &variables);
        assert!(filled.prompt.starts_with("Review the following Rust code with a focus on correctness."));
    }

    #[test]
    fn test_fill_leaves_unknown_tokens() {
        let template = find_template("marketing-email").unwrap();
        let filled = fill_template(template, &vars(&[("product", "Acme Sync"), ("extra", "x")]));

        assert!(filled.prompt.contains("announcing Acme Sync to {{segment}}"));
        assert!(filled.prompt.contains("under 200 words"));
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let template = find_template("code-review").unwrap();
        let report = validate_template_variables(
            template,
            &vars(&[("language", "Rust 2021!"), ("code", "x = 1"), ("focus", "style")]),
        );

        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![
                "language has an invalid format",
                "code must be at least 10 characters",
                "focus must be one of: correctness, performance, security, readability",
            ]
        );
    }

    #[test]
    fn test_validation_required_and_numbers() {
        let template = find_template("blog-post").unwrap();

        let report = validate_template_variables(template, &vars(&[("topic", "  "), ("length", "long")]));
        assert_eq!(
            report.errors,
            vec!["topic is required", "audience is required", "length must be a number"]
        );

        let report = validate_template_variables(
            template,
            &vars(&[("topic", "Rust ownership"), ("audience", "new developers"), ("tone", "Casual")]),
        );
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_validation_pattern_on_number() {
        let template = find_template("literature-review").unwrap();
        let report = validate_template_variables(
            template,
            &vars(&[("topic", "sleep and memory"), ("since_year", "99")]),
        );
        assert_eq!(report.errors, vec!["since_year has an invalid format"]);
    }
}
