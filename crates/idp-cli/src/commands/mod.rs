//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use idp_core::extraction::export;
use idp_core::{ExtractionResult, IdpConfig, OcrLine};

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text, one `name: value` line per field
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    IdpConfig::default_path(&dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")))
}

/// The `-c` path when given, else the default path, else built-in defaults.
pub fn config_path(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<IdpConfig> {
    if let Some(path) = config_path {
        return IdpConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(IdpConfig::from_file(&path)?)
    } else {
        Ok(IdpConfig::default())
    }
}

/// Read OCR lines from a JSON dump (array of lines) or a plain text file.
pub fn read_lines(path: &Path) -> anyhow::Result<Vec<OcrLine>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Invalid OCR line dump: {}", path.display())),
        "txt" => Ok(content.lines().map(|l| OcrLine::new(l, 1.0)).collect()),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => export::to_json_pretty(result)?,
        OutputFormat::Text => export::to_text(result),
    })
}
