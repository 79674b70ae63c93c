//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.gradeviz.toml` files.

use crate::models::{ModelCatalog, ModelInfo};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".gradeviz.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Models, topics and categories to load.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Chart geometry and scales.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// Which grade files exist and how they are scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Topic identifiers, lowercase as they appear in file names.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,

    /// Score category column names.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Run suffix in grade file names.
    #[serde(default = "default_run")]
    pub run: String,

    /// Evaluated models, in canonical order.
    #[serde(default = "default_models")]
    pub models: Vec<ModelInfo>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            categories: default_categories(),
            run: default_run(),
            models: default_models(),
        }
    }
}

fn default_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo::new("anthropic", "Claude Sonnet 4.5", "Claude"),
        ModelInfo::new("google", "Google Gemini 2.5 Flash", "Gemini"),
        ModelInfo::new("openai", "ChatGPT-5.1", "ChatGPT"),
    ]
}

fn default_topics() -> Vec<String> {
    vec!["bfs".to_string(), "dfs".to_string()]
}

fn default_categories() -> Vec<String> {
    vec![
        "Correctness".to_string(),
        "Completeness".to_string(),
        "Visualization & Examples".to_string(),
    ]
}

fn default_run() -> String {
    "01".to_string()
}

impl DatasetConfig {
    /// Ordered identifier to display-name mapping.
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.clone())
    }

    /// Uppercased topic identifiers, as stored in score records.
    pub fn topic_labels(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.to_uppercase()).collect()
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `{model}-{topic}-{run}.csv` files.
    #[serde(default = "default_grades_dir")]
    pub grades_dir: PathBuf,

    /// Directory the figures are written to. Must already exist.
    #[serde(default = "default_figures_dir")]
    pub figures_dir: PathBuf,

    /// File name of the grouped bar chart.
    #[serde(default = "default_overall_file")]
    pub overall_file: String,

    /// File name of the heatmap.
    #[serde(default = "default_heatmap_file")]
    pub heatmap_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            grades_dir: default_grades_dir(),
            figures_dir: default_figures_dir(),
            overall_file: default_overall_file(),
            heatmap_file: default_heatmap_file(),
        }
    }
}

fn default_grades_dir() -> PathBuf {
    PathBuf::from("grades")
}

fn default_figures_dir() -> PathBuf {
    PathBuf::from("figures")
}

fn default_overall_file() -> String {
    "overall.png".to_string()
}

fn default_heatmap_file() -> String {
    "heatmap.png".to_string()
}

impl PathsConfig {
    pub fn overall_path(&self) -> PathBuf {
        self.figures_dir.join(&self.overall_file)
    }

    pub fn heatmap_path(&self) -> PathBuf {
        self.figures_dir.join(&self.heatmap_file)
    }
}

/// Chart geometry and value scales.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Pixels per inch.
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Base font size in points.
    #[serde(default = "default_font_pt")]
    pub font_pt: f64,

    /// Bar chart size in inches (width, height).
    #[serde(default = "default_overall_size")]
    pub overall_size: (f64, f64),

    /// Heatmap size in inches (width, height).
    #[serde(default = "default_heatmap_size")]
    pub heatmap_size: (f64, f64),

    /// Upper bound of the bar chart y-axis.
    #[serde(default = "default_y_max")]
    pub y_max: f64,

    /// Lowest possible score (heatmap colour scale start).
    #[serde(default = "default_score_min")]
    pub score_min: f64,

    /// Highest possible score (heatmap colour scale end).
    #[serde(default = "default_score_max")]
    pub score_max: f64,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            font_pt: default_font_pt(),
            overall_size: default_overall_size(),
            heatmap_size: default_heatmap_size(),
            y_max: default_y_max(),
            score_min: default_score_min(),
            score_max: default_score_max(),
        }
    }
}

fn default_dpi() -> u32 {
    300
}

fn default_font_pt() -> f64 {
    10.0
}

fn default_overall_size() -> (f64, f64) {
    (10.0, 6.0)
}

fn default_heatmap_size() -> (f64, f64) {
    (8.0, 6.0)
}

fn default_y_max() -> f64 {
    2.2
}

fn default_score_min() -> f64 {
    0.0
}

fn default_score_max() -> f64 {
    2.0
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only arguments the user actually supplied override file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.grades_dir {
            self.paths.grades_dir = dir.clone();
        }
        if let Some(ref dir) = args.figures_dir {
            self.paths.figures_dir = dir.clone();
        }
    }

    /// Check the settings that would otherwise fail deep inside the pipeline.
    pub fn validate(&self) -> Result<()> {
        let dataset = &self.dataset;
        if dataset.catalog().is_empty() {
            bail!("At least one model must be configured");
        }
        if dataset.topics.is_empty() {
            bail!("At least one topic must be configured");
        }
        if dataset.categories.is_empty() {
            bail!("At least one score category must be configured");
        }

        let mut seen = HashSet::new();
        for model in &dataset.models {
            if !seen.insert(model.id.as_str()) {
                bail!("Duplicate model id in config: {}", model.id);
            }
        }

        let charts = &self.charts;
        if charts.dpi == 0 {
            bail!("Chart dpi must be at least 1");
        }
        let (ow, oh) = charts.overall_size;
        let (hw, hh) = charts.heatmap_size;
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !(positive(ow) && positive(oh) && positive(hw) && positive(hh)) {
            bail!("Figure sizes must be positive");
        }
        if ![charts.score_min, charts.score_max, charts.y_max]
            .iter()
            .all(|v| v.is_finite())
        {
            bail!("Score range and y_max must be finite numbers");
        }
        if charts.score_min >= charts.score_max {
            bail!(
                "score_min ({}) must be below score_max ({})",
                charts.score_min,
                charts.score_max
            );
        }
        if charts.y_max <= charts.score_min {
            bail!("y_max must be above score_min");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset.models.len(), 3);
        assert_eq!(config.dataset.models[0].id, "anthropic");
        assert_eq!(config.dataset.topic_labels(), vec!["BFS", "DFS"]);
        assert_eq!(config.dataset.categories[2], "Visualization & Examples");
        assert_eq!(config.paths.overall_path(), PathBuf::from("figures/overall.png"));
        assert_eq!(config.paths.heatmap_path(), PathBuf::from("figures/heatmap.png"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[dataset]
topics = ["bfs"]
run = "02"

[[dataset.models]]
id = "mistral"
display = "Mistral Large"
short = "Mistral"

[paths]
grades_dir = "data/grades"

[charts]
dpi = 96
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.dataset.models.len(), 1);
        assert_eq!(config.dataset.catalog().short_name("mistral"), Some("Mistral"));
        assert_eq!(config.dataset.topics, vec!["bfs"]);
        assert_eq!(config.dataset.run, "02");
        assert_eq!(config.dataset.categories.len(), 3);
        assert_eq!(config.paths.grades_dir, PathBuf::from("data/grades"));
        assert_eq!(config.paths.figures_dir, PathBuf::from("figures"));
        assert_eq!(config.charts.dpi, 96);
        assert_eq!(config.charts.y_max, 2.2);
    }

    #[test]
    fn test_validate_rejects_duplicate_models() {
        let mut config = Config::default();
        config
            .dataset
            .models
            .push(ModelInfo::new("openai", "Again", "Again"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_score_range() {
        let mut config = Config::default();
        config.charts.score_min = 2.0;
        config.charts.score_max = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_models() {
        let mut config = Config::default();
        config.dataset.models.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_sizes() {
        let mut config = Config::default();
        config.charts.heatmap_size = (f64::NAN, 6.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.charts.overall_size = (10.0, f64::INFINITY);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.charts.y_max = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[dataset]"));
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[charts]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.dataset.models, Config::default().dataset.models);
    }
}
