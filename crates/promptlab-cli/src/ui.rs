//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use futures::StreamExt;
use std::collections::HashMap;
use std::io::{self, BufRead, IsTerminal, Write};

use promptlab_core::{
    Impact, IssueSeverity, OptimizedPrompt, PromptAnalysis, Result, StreamEvent, TextStream,
};

const PROMPT_LABEL: &str = "promptlab>";

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "Promptlab - Prompt Analyzer & Optimizer";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        title.blue().bold(),
        " ".repeat(banner_width.saturating_sub(title.chars().count() + 4)),
        "│".blue()
    );

    println!("{}", empty_line.blue());

    let feature_lines = [
        "Features:",
        "• Heuristic scoring with issues and strengths",
        "• Clarifying questions for missing elements",
        "• Rule-based rewrite into Role/Context/Task/Format",
        "• Markdown, JSON and plain-text export",
        "",
        "Type a prompt, or 'help' for commands",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let padding = " ".repeat(banner_width.saturating_sub(line.chars().count() + 4));
            println!("{}", format!("│  {}{}│", line, padding).blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
}

/// Handle input with history navigation. `None` means end of input.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    // Piped input is read line by line
    if !io::stdin().is_terminal() {
        return read_input_line(&mut io::stdin().lock(), history);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if let Some(line) = input.as_ref().filter(|line| !line.is_empty()) {
        history.push(line.clone());
    }
    Ok(input)
}

/// Read one trimmed line from `reader`; `None` once the reader is exhausted
pub fn read_input_line<R: BufRead>(reader: &mut R, history: &mut Vec<String>) -> Result<Option<String>> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Ok(None);
    }

    let input = input.trim().to_string();
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(Some(input))
}

fn read_line_raw(history: &[String]) -> Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    redraw(&input)?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
            match key_event.code {
                KeyCode::Enter => return Ok(Some(input)),
                KeyCode::Esc => return Ok(Some(String::new())),
                KeyCode::Char('c') if ctrl => return Ok(None),
                KeyCode::Char('d') if ctrl && input.is_empty() => return Ok(None),
                KeyCode::Char(c) => {
                    input.push(c);
                    redraw(&input)?;
                }
                KeyCode::Backspace => {
                    input.pop();
                    redraw(&input)?;
                }
                KeyCode::Up if !history.is_empty() => {
                    let new_index = match history_index {
                        None => history.len() - 1,
                        Some(idx) => idx.saturating_sub(1),
                    };
                    history_index = Some(new_index);
                    input = history[new_index].clone();
                    redraw(&input)?;
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx + 1 < history.len() {
                            history_index = Some(idx + 1);
                            input = history[idx + 1].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        redraw(&input)?;
                    }
                }
                _ => {}
            }
        }
    }
}

fn redraw(input: &str) -> Result<()> {
    print!(
        "\r{}\r{} {}",
        " ".repeat(input.chars().count() + PROMPT_LABEL.len() + 8),
        PROMPT_LABEL.green().bold(),
        input
    );
    io::stdout().flush()?;
    Ok(())
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Analyze and optimize a prompt", "<prompt>".green());
    println!("  {} - List the template catalog", "templates".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  Write a blog post");
    println!("  You are a data analyst. Summarize this CSV as a table.");
}

/// Print an analysis report
pub fn print_analysis(analysis: &PromptAnalysis) {
    println!(
        "{} {}  {} {}  {} {}",
        "Score:".bold(),
        score_label(analysis.score),
        "Category:".bold(),
        analysis.category.as_str().cyan(),
        "Complexity:".bold(),
        analysis.complexity.as_str().cyan()
    );
    println!(
        "{} ~{} ({} context)",
        "Tokens:".bold(),
        analysis.token_estimate,
        analysis.context_requirement.as_str()
    );

    if !analysis.issues.is_empty() {
        println!("\n{}", "Issues:".bold());
        for issue in &analysis.issues {
            let marker = match issue.severity {
                IssueSeverity::Critical => "✗".red(),
                IssueSeverity::Warning => "!".yellow(),
                IssueSeverity::Suggestion => "·".dimmed(),
            };
            println!("  {} {}", marker, issue.message);
            if let Some(fix) = &issue.suggested_fix {
                println!("    {}", fix.dimmed());
            }
        }
    }

    if !analysis.strengths.is_empty() {
        println!("\n{}", "Strengths:".bold());
        for strength in &analysis.strengths {
            println!("  {} {}", "✓".green(), strength);
        }
    }

    if !analysis.suggestions.is_empty() {
        println!("\n{}", "Suggestions:".bold());
        for suggestion in &analysis.suggestions {
            let impact = match suggestion.impact {
                Impact::High => "high".red(),
                Impact::Medium => "medium".yellow(),
                Impact::Low => "low".dimmed(),
            };
            println!("  [{}] {}", impact, suggestion.description);
        }
    }
    println!();
}

/// Print an optimized prompt with its scores
pub fn print_optimized(optimized: &OptimizedPrompt) {
    let metadata = &optimized.metadata;
    println!(
        "{} {} → {}",
        "Score:".bold(),
        score_label(metadata.original_score),
        score_label(metadata.optimized_score)
    );

    if let Some(system_prompt) = &optimized.system_prompt {
        println!("\n{}\n{}", "System prompt:".bold(), system_prompt);
    }
    println!("\n{}\n{}", "Optimized prompt:".bold(), optimized.content.cyan());

    if !optimized.improvements.is_empty() {
        println!("\n{}", "Improvements:".bold());
        for improvement in &optimized.improvements {
            println!("  {} {}", "+".green(), improvement);
        }
    }

    println!(
        "\n{}",
        format!(
            "{} tokens · ~${:.6} · {}",
            metadata.token_count, metadata.estimated_cost, optimized.explanation
        )
        .dimmed()
    );
    println!();
}

fn score_label(score: u8) -> ColoredString {
    let label = format!("{}/100", score);
    match score {
        70..=100 => label.green().bold(),
        40..=69 => label.yellow().bold(),
        _ => label.red().bold(),
    }
}

/// The (answer key, question) pairs worth asking for an analysis
pub fn clarifying_targets(analysis: &PromptAnalysis) -> Vec<(&str, &str)> {
    analysis
        .missing_elements
        .iter()
        .filter(|element| element.importance.warrants_question())
        .take(3)
        .map(|element| (element.name.as_str(), element.clarifying_question.as_str()))
        .collect()
}

/// Ask the clarifying questions on stdin; blank answers are skipped
pub fn ask_clarifying_questions(analysis: &PromptAnalysis) -> Result<HashMap<String, String>> {
    let mut answers = HashMap::new();

    for (key, question) in clarifying_targets(analysis) {
        print!("{} {} ", "?".cyan().bold(), question);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        let answer = answer.trim();
        if !answer.is_empty() {
            answers.insert(key.to_string(), answer.to_string());
        }
    }

    Ok(answers)
}

/// Print deltas as they arrive; returns the collected text
pub async fn print_stream(mut stream: TextStream) -> Result<String> {
    let mut text = String::new();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Delta(delta) => {
                print!("{}", delta);
                io::stdout().flush()?;
                text.push_str(&delta);
            }
            StreamEvent::Done => break,
        }
    }

    println!();
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use promptlab_engine::{analyze, generate_clarifying_questions};
    use std::io::Cursor;

    #[test]
    fn test_clarifying_targets_match_engine_questions() {
        let analysis = analyze("Write a blog post");
        let targets = clarifying_targets(&analysis);
        let questions: Vec<String> = targets.iter().map(|(_, q)| q.to_string()).collect();

        assert_eq!(questions, generate_clarifying_questions(&analysis));
        assert_eq!(targets[0].0, "role");
    }

    #[test]
    fn test_read_input_line_signals_end_of_input() {
        let mut reader = Cursor::new("Write a blog post\n\n  exit  ");
        let mut history = Vec::new();
        let mut lines = Vec::new();

        while let Some(line) = read_input_line(&mut reader, &mut history).unwrap() {
            lines.push(line);
        }

        assert_eq!(lines, vec!["Write a blog post", "", "exit"]);
        assert_eq!(history, vec!["Write a blog post", "exit"]);
        assert_eq!(read_input_line(&mut reader, &mut history).unwrap(), None);
    }

    #[test]
    fn test_read_input_line_on_empty_reader() {
        let mut history = Vec::new();
        assert_eq!(read_input_line(&mut Cursor::new(""), &mut history).unwrap(), None);
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_print_stream_collects_until_done() {
        let events: Vec<Result<StreamEvent>> = vec![
            Ok(StreamEvent::Delta("Hello".to_string())),
            Ok(StreamEvent::Delta(" there".to_string())),
            Ok(StreamEvent::Done),
            Ok(StreamEvent::Delta("late".to_string())),
        ];
        let text = print_stream(Box::pin(stream::iter(events))).await.unwrap();
        assert_eq!(text, "Hello there");
    }
}
