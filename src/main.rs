use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use futures::StreamExt;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use promptlab_cli::{
    ask_clarifying_questions, display_banner, handle_input_with_history, print_analysis,
    print_help, print_optimized, print_stream, write_export, PromptEnhancer,
};
use promptlab_engine::{
    analyze, export_prompt, fill_template, find_template, optimize_with, templates,
    templates_for_category, validate_template_variables, ExportFormat, OptimizeOptions,
    OptimizedPrompt, PromptCategory, VariableKind,
};
use promptlab_providers::{sse, ChatClient, TextStream};

#[derive(Parser)]
#[command(name = "promptlab")]
#[command(about = "Analyze, score and optimize prompts for LLMs", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a prompt and list its issues, strengths and missing elements
    Analyze {
        prompt: String,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rebuild a prompt from answers to the clarifying questions
    Optimize {
        prompt: String,
        /// Answer to a clarifying question, e.g. --answer role="senior engineer"
        #[arg(short, long = "answer", value_parser = parse_key_val)]
        answers: Vec<(String, String)>,
        /// Ask the clarifying questions interactively
        #[arg(long)]
        ask: bool,
        /// Keep the role out of the prompt body; it is sent as a system message
        #[arg(long)]
        system_prompt: bool,
        /// Export format: markdown, json or text
        #[arg(short, long, default_value = "markdown")]
        format: ExportFormat,
        /// Write the export to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Browse and fill the template catalog
    Templates {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Stream an LLM rewrite of a prompt
    Enhance {
        prompt: String,
        /// Emit server-sent event frames instead of plain text
        #[arg(long)]
        sse: bool,
    },
    /// Optimize a prompt and send it to the configured LLM
    Run {
        prompt: String,
        #[arg(short, long = "answer", value_parser = parse_key_val)]
        answers: Vec<(String, String)>,
        /// Emit server-sent event frames instead of plain text
        #[arg(long)]
        sse: bool,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// List templates, optionally for one category
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show a template and its variables
    Show { id: String },
    /// Validate variables and fill a template
    Fill {
        id: String,
        #[arg(short, long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Analyze { prompt, json }) => {
            let analysis = analyze(&prompt);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
        }
        Some(Commands::Optimize {
            prompt,
            answers,
            ask,
            system_prompt,
            format,
            output,
        }) => {
            let analysis = analyze(&prompt);
            tracing::debug!(score = analysis.score, category = %analysis.category, "Analyzed prompt");
            let mut responses: HashMap<String, String> = answers.into_iter().collect();
            if ask {
                print_analysis(&analysis);
                for (key, value) in ask_clarifying_questions(&analysis)? {
                    responses.entry(key).or_insert(value);
                }
            }

            let options = OptimizeOptions {
                system_prompt_channel: system_prompt,
            };
            let optimized = optimize_with(&prompt, &analysis, &responses, &options);
            emit_export(&optimized, format, output).await?;
        }
        Some(Commands::Templates { action }) => run_templates(action)?,
        Some(Commands::Enhance { prompt, sse }) => {
            let enhancer = PromptEnhancer::new(ChatClient::from_env()?);
            let stream = enhancer.enhance(&prompt, &analyze(&prompt)).await?;
            relay(stream, sse).await?;
        }
        Some(Commands::Run { prompt, answers, sse }) => {
            let analysis = analyze(&prompt);
            let responses: HashMap<String, String> = answers.into_iter().collect();
            let options = OptimizeOptions {
                system_prompt_channel: true,
            };
            let optimized = optimize_with(&prompt, &analysis, &responses, &options);

            let enhancer = PromptEnhancer::new(ChatClient::from_env()?);
            let stream = enhancer.run(&optimized).await?;
            relay(stream, sse).await?;
        }
        None => run_interactive().await?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn emit_export(
    optimized: &OptimizedPrompt,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let exported = export_prompt(optimized, format);
    match output {
        Some(path) => {
            write_export(&path, &exported)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Saved {} export to {}", "✓".green(), format, path.display());
        }
        None => println!("{}", exported),
    }
    Ok(())
}

async fn relay(stream: TextStream, as_sse: bool) -> Result<()> {
    if !as_sse {
        print_stream(stream).await?;
        return Ok(());
    }

    let mut frames = Box::pin(sse::to_sse_frames(stream));
    let mut stdout = io::stdout();
    while let Some(frame) = frames.next().await {
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

fn run_templates(action: TemplateAction) -> Result<()> {
    match action {
        TemplateAction::List { category } => {
            let listed = match category {
                Some(name) => {
                    let category = PromptCategory::from_name(&name)
                        .with_context(|| format!("Unknown category '{}'", name))?;
                    templates_for_category(category)
                }
                None => templates().iter().collect(),
            };

            for template in listed {
                println!(
                    "{} {} {}",
                    template.id.green().bold(),
                    format!("[{}]", template.category).dimmed(),
                    template.description
                );
            }
        }
        TemplateAction::Show { id } => {
            let template = find_template(&id).with_context(|| format!("Unknown template '{}'", id))?;

            println!("{} ({})\n", template.name.bold(), template.category);
            if let Some(system_prompt) = template.system_prompt {
                println!("{}\n{}\n", "System prompt:".bold(), system_prompt);
            }
            println!("{}\n{}\n", "Template:".bold(), template.template);
            println!("{}", "Variables:".bold());
            for variable in &template.variables {
                let kind = match &variable.kind {
                    VariableKind::Text => "text".to_string(),
                    VariableKind::Number => "number".to_string(),
                    VariableKind::Select(options) => format!("one of {}", options.join("/")),
                };
                let required = if variable.required { " (required)" } else { "" };
                let default = variable
                    .default
                    .map(|d| format!(" [default: {}]", d))
                    .unwrap_or_default();
                println!(
                    "  {} - {}, {}{}{}",
                    variable.name.green(),
                    variable.description,
                    kind,
                    required,
                    default.dimmed()
                );
            }
        }
        TemplateAction::Fill { id, vars } => {
            let template = find_template(&id).with_context(|| format!("Unknown template '{}'", id))?;
            let vars: HashMap<String, String> = vars.into_iter().collect();

            let report = validate_template_variables(template, &vars);
            if !report.is_valid {
                for error in &report.errors {
                    eprintln!("{} {}", "✗".red(), error);
                }
                bail!("Template '{}' has {} invalid variable(s)", id, report.errors.len());
            }

            let filled = fill_template(template, &vars);
            if let Some(system_prompt) = &filled.system_prompt {
                print!("{}\n\n", system_prompt);
            }
            println!("{}", filled.prompt);
        }
    }
    Ok(())
}

async fn run_interactive() -> Result<()> {
    display_banner();
    let mut history = Vec::new();

    while let Some(input) = handle_input_with_history(&mut history).await? {
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("{}", "Goodbye!".green());
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            "templates" => {
                run_templates(TemplateAction::List { category: None })?;
                continue;
            }
            _ => {}
        }

        let analysis = analyze(&input);
        print_analysis(&analysis);

        let responses = ask_clarifying_questions(&analysis)?;
        let optimized = optimize_with(&input, &analysis, &responses, &OptimizeOptions::default());
        print_optimized(&optimized);
    }

    Ok(())
}
