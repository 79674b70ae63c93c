//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// gradeviz - aggregate and chart LLM grading results
///
/// Reads `{model}-{topic}-{run}.csv` grade files, averages the scores by
/// model and by model/topic, draws a grouped bar chart and a heatmap, and
/// prints summary statistics.
///
/// Examples:
///   gradeviz
///   gradeviz --grades-dir data/grades --figures-dir out
///   gradeviz --summary-json summary.json --no-charts
///   gradeviz --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing the grade CSV files
    ///
    /// Overrides `paths.grades_dir` from the config file (default: grades).
    #[arg(long, value_name = "DIR", env = "GRADEVIZ_GRADES_DIR")]
    pub grades_dir: Option<PathBuf>,

    /// Directory the figures are written to (must already exist)
    ///
    /// Overrides `paths.figures_dir` from the config file (default: figures).
    #[arg(long, value_name = "DIR", env = "GRADEVIZ_FIGURES_DIR")]
    pub figures_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gradeviz.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the aggregates and statistics as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Skip chart rendering and only print the report
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .gradeviz.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        if let Some(ref summary) = self.summary_json {
            if summary.is_dir() {
                return Err(format!(
                    "Summary path is a directory: {}",
                    summary.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
