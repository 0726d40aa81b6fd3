//! Extract command - pull fields out of a single OCR line dump.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use idp_core::DocumentExtractor;

use super::{format_result, load_config, read_lines, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file: JSON array of OCR lines, or plain text
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show document type and classifier confidence
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let lines = read_lines(&args.input)?;
    let extractor = DocumentExtractor::try_from_config(&config)?;
    let result = extractor.run(&lines);

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        match args.format {
            OutputFormat::Json => println!("{}", output),
            OutputFormat::Text => print!("{}", output),
        }
    }

    if args.show_confidence {
        eprintln!(
            "{} Document type: {} ({:.1}%)",
            style("ℹ").blue(),
            result.document_type,
            result.confidence * 100.0
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
