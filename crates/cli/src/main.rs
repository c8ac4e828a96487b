//! CLI tool for generating a five-slide PowerPoint deck from text.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::{
    fallback_records, generate_records, ContentGenerator, GenerationRequest, OUTPUT_FILENAME,
};
use deck_pptx::{render_deck, RenderedDeck};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Generate a 5-slide PowerPoint deck from text, optionally on a design template.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input text to turn into slides
    #[arg(short, long, conflicts_with = "input_file")]
    text: Option<String>,

    /// Read the input text from a file
    #[arg(short = 'f', long)]
    input_file: Option<PathBuf>,

    /// Extra guidance for the content generator
    #[arg(short, long, default_value = "")]
    guidance: String,

    /// Design template (.pptx) to fill instead of synthesizing a deck
    #[arg(short = 'T', long)]
    template: Option<PathBuf>,

    /// Captured content generator response ("-" reads stdin)
    #[arg(short, long)]
    response: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = OUTPUT_FILENAME)]
    output: PathBuf,

    /// Print the generator prompt and exit
    #[arg(long)]
    print_prompt: bool,

    /// Write a JSON report of what was changed
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Generator answered from a response captured ahead of time.
struct ResponseFile {
    path: PathBuf,
}

impl ContentGenerator for ResponseFile {
    fn generate(&self, _request: &GenerationRequest) -> deck_core::Result<String> {
        let mut text = String::new();
        if self.path.as_os_str() == "-" {
            std::io::stdin().read_to_string(&mut text)?;
        } else {
            File::open(&self.path)?.read_to_string(&mut text)?;
        }
        Ok(text)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let input = read_input(&args)?;
    let request = GenerationRequest::new(&input, &args.guidance)?;

    if args.print_prompt {
        print!("{}", request.prompt());
        return Ok(());
    }

    let records = match &args.response {
        Some(path) => generate_records(&ResponseFile { path: path.clone() }, &request),
        None => {
            log::warn!("No generator response given, using placeholder deck");
            fallback_records()
        }
    };

    if args.verbose {
        eprintln!("Extracted {} slide records", records.len());
    }

    let template = match &args.template {
        Some(path) => Some(
            std::fs::read(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?,
        ),
        None => None,
    };

    let deck = render_deck(&records, template.as_deref())
        .with_context(|| "Failed to render deck")?;

    write_output(&args.output, &deck.bytes)?;
    if let Some(report_path) = &args.report {
        write_report(report_path, &deck)?;
    }

    println!(
        "Wrote {} ({} slides, {}, {} shapes skipped)",
        args.output.display(),
        deck.slide_count,
        match deck.source {
            deck_pptx::DeckSource::Template => "from template",
            deck_pptx::DeckSource::Synthesized => "synthesized",
        },
        deck.skipped_shapes()
    );

    Ok(())
}

/// Input text from `--text` or `--input-file`.
fn read_input(args: &Args) -> Result<String> {
    match (&args.text, &args.input_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input {}", path.display())),
        (None, None) => anyhow::bail!("Provide input text with --text or --input-file"),
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

fn write_report(path: &Path, deck: &RenderedDeck) -> Result<()> {
    let json = serde_json::to_string_pretty(deck).context("Failed to serialize report")?;
    write_output(path, json.as_bytes())
}
