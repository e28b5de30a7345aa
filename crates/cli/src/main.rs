//! CLI tool for converting Word documents into PowerPoint decks.

use anyhow::{bail, Context, Result};
use clap::Parser;
use deck_core::pipeline;
use deck_docx::DocxParser;
use deck_outline::{GeneratorConfig, OpenAiGenerator};
use deck_pptx::DeckWriter;
use std::path::PathBuf;

/// Convert a Word document into a populated PowerPoint deck.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input Word document (.docx)
    input: PathBuf,

    /// Template presentation providing the theme and layouts
    #[arg(short, long, default_value = "template.pptx")]
    template: PathBuf,

    /// Output path (default: input with a .pptx extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chat model used for outline generation
    #[arg(long, default_value = "gpt-4o")]
    model: String,

    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if !args.input.exists() {
        bail!("Input document not found: {}", args.input.display());
    }
    if !args.template.exists() {
        bail!("Template not found: {}", args.template.display());
    }

    let output = match &args.output {
        Some(path) => path.clone(),
        None => args.input.with_extension("pptx"),
    };
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }

    let paragraphs = DocxParser::new()
        .parse_file(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    if args.verbose {
        eprintln!("  Found {} paragraphs", paragraphs.len());
    }

    let mut deck = DeckWriter::open(&args.template)
        .with_context(|| format!("Failed to open template {}", args.template.display()))?;
    let layouts = deck.template_layouts();

    if args.verbose {
        eprintln!("  Template has {} layouts", layouts.len());
    }

    let generator = OpenAiGenerator::new(GeneratorConfig::new(&args.api_key).with_model(&args.model))?;

    let summary = pipeline::run(&paragraphs, &layouts, &generator, &mut deck, &output)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    println!(
        "Created {} ({} slides from {} sections)",
        output.display(),
        summary.slide_count,
        summary.section_count
    );

    Ok(())
}
