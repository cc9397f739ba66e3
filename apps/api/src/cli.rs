//! Command-line surface for one-off analyses.

use std::fmt::Write as _;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::detector::AnalysisReport;

/// Characters of the input echoed back in verbose output.
const PREVIEW_CHARS: usize = 100;

#[derive(Parser, Debug)]
#[command(
    name = "factcheck",
    version,
    about = "Analyze news text for signs of misinformation"
)]
pub struct Cli {
    #[arg(long, conflicts_with = "file", help = "Text to analyze")]
    pub text: Option<String>,
    #[arg(long, help = "Read the text to analyze from a file")]
    pub file: Option<PathBuf>,
    #[arg(long, help = "Gemini API key (defaults to GEMINI_API_KEY)")]
    pub api_key: Option<String>,
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(short, long, help = "Show the full analysis")]
    pub verbose: bool,
}

impl Cli {
    /// `--text`, then `--file`, then stdin.
    pub fn read_input(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read text from stdin")?;
        Ok(buf)
    }
}

/// Human-readable rendering of a report.
pub fn render_report(text: &str, report: &AnalysisReport, verbose: bool) -> String {
    let result = &report.result;
    let mut out = String::new();

    if !verbose {
        let _ = writeln!(
            out,
            "{} ({:.1}% confidence)",
            result.prediction(),
            result.confidence() * 100.0
        );
        if !result.reasoning().is_empty() {
            let _ = writeln!(out, "{}", result.reasoning());
        }
        return out;
    }

    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if text.chars().count() > PREVIEW_CHARS { "..." } else { "" };

    let _ = writeln!(out, "=== FAKE NEWS ANALYSIS ({}) ===", report.model);
    let _ = writeln!(out, "Text: {preview}{ellipsis}");
    let _ = writeln!(out, "Prediction: {}", result.prediction());
    let _ = writeln!(out, "Confidence: {:.2}%", result.confidence() * 100.0);
    let _ = writeln!(out, "Reasoning: {}", result.reasoning());
    let _ = writeln!(out, "Source Quality: {}", result.source_quality());
    let _ = writeln!(out, "Factual Accuracy: {}", result.factual_accuracy());
    if !result.red_flags().is_empty() {
        let _ = writeln!(out, "Red Flags: {}", result.red_flags().join(", "));
    }
    if report.input_truncated {
        let _ = writeln!(out, "Note: input was truncated before analysis");
    }
    if result.is_degraded() {
        let _ = writeln!(out, "Note: the model reply was off-format; some fields are defaults");
    }
    let _ = writeln!(out, "{}", "=".repeat(40));
    out
}
