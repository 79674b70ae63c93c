//! Data models for the grade report.
//!
//! This module contains the core data structures passed between the
//! loader, the aggregator, the chart renderer and the reporter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One evaluated model: identifier plus its human-readable names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Identifier used in grade file names (e.g. `anthropic`).
    pub id: String,
    /// Full display name used in chart legends.
    pub display: String,
    /// Short display name used in heatmap row labels.
    pub short: String,
}

impl ModelInfo {
    pub fn new(id: &str, display: &str, short: &str) -> Self {
        Self {
            id: id.to_string(),
            display: display.to_string(),
            short: short.to_string(),
        }
    }
}

/// Ordered mapping from model identifier to display names.
///
/// Iteration order is the canonical enumeration order used for file
/// loading, aggregation output and chart series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<ModelInfo>,
}

impl ModelCatalog {
    pub fn new(entries: Vec<ModelInfo>) -> Self {
        Self { entries }
    }

    /// Model identifiers in canonical order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|m| m.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, id: &str) -> Option<&ModelInfo> {
        self.entries.iter().find(|m| m.id == id)
    }

    /// Full display name for a model identifier.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.get(id).map(|m| m.display.as_str())
    }

    /// Short display name for a model identifier.
    pub fn short_name(&self, id: &str) -> Option<&str> {
        self.get(id).map(|m| m.short.as_str())
    }
}

/// A single graded run, tagged with its source model and topic.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    /// Model identifier the source file belongs to.
    pub model: String,
    /// Topic identifier, uppercased.
    pub topic: String,
    /// One score per category, aligned with [`CombinedTable::categories`].
    pub scores: Vec<f64>,
    /// Remaining source columns as `(header, value)`, in file order.
    pub extras: Vec<(String, String)>,
}

/// Every score record from every grade file, in read order.
#[derive(Debug, Clone, Default)]
pub struct CombinedTable {
    /// Score category names.
    pub categories: Vec<String>,
    /// All records, model-major then topic.
    pub records: Vec<ScoreRecord>,
    /// Files the records were read from, in read order.
    pub sources: Vec<PathBuf>,
}

impl CombinedTable {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            categories,
            records: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All values of one category across the table.
    pub fn column(&self, category: usize) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(move |r| r.scores[category])
    }
}

/// Mean score per category for one model, across all topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAggregate {
    pub model: String,
    pub means: Vec<f64>,
}

/// Mean score per category for one (model, topic) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTopicAggregate {
    pub model: String,
    pub topic: String,
    pub means: Vec<f64>,
}

/// Overall statistics of one category across the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Metadata about a summary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Version of the tool that produced the summary.
    pub tool_version: String,
    /// Date and time the summary was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of score records loaded.
    pub rows: usize,
    /// Grade files read, in read order.
    pub files: Vec<String>,
}

/// Machine-readable counterpart of the text report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub metadata: SummaryMetadata,
    pub categories: Vec<String>,
    pub by_model: Vec<ModelAggregate>,
    pub by_model_topic: Vec<ModelTopicAggregate>,
    pub overall: Vec<CategoryStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ModelCatalog {
        ModelCatalog::new(vec![
            ModelInfo::new("anthropic", "Claude Sonnet 4.5", "Claude"),
            ModelInfo::new("openai", "ChatGPT-5.1", "ChatGPT"),
        ])
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.display_name("openai"), Some("ChatGPT-5.1"));
        assert_eq!(catalog.short_name("anthropic"), Some("Claude"));
        assert_eq!(catalog.display_name("mistral"), None);
    }

    #[test]
    fn test_catalog_order() {
        let catalog = catalog();
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(ids, vec!["anthropic", "openai"]);
    }

    #[test]
    fn test_table_column() {
        let mut table = CombinedTable::new(vec!["A".to_string(), "B".to_string()]);
        table.records.push(ScoreRecord {
            model: "openai".to_string(),
            topic: "BFS".to_string(),
            scores: vec![1.0, 2.0],
            extras: Vec::new(),
        });
        table.records.push(ScoreRecord {
            model: "openai".to_string(),
            topic: "DFS".to_string(),
            scores: vec![0.5, 1.5],
            extras: Vec::new(),
        });

        assert_eq!(table.len(), 2);
        assert_eq!(table.column(1).collect::<Vec<_>>(), vec![2.0, 1.5]);
    }
}
