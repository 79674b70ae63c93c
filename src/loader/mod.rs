//! Grade file loading.
//!
//! This module reads one CSV per (model, topic) pair and concatenates
//! the rows into a single [`CombinedTable`]. Any missing or malformed
//! file aborts the load; there is no skip-and-continue.

use crate::config::DatasetConfig;
use crate::models::{CombinedTable, ScoreRecord};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Columns the loader fills in itself; source values are superseded.
const TAG_COLUMNS: [&str; 2] = ["Model", "Topic"];

/// Errors raised while reading grade files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open grade file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed grade file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("grade file {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("grade file {path}, line {line}: '{column}' value {value:?} is not a number")]
    InvalidScore {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
}

/// Reads the grade files of one dataset.
pub struct GradeLoader<'a> {
    grades_dir: PathBuf,
    dataset: &'a DatasetConfig,
}

impl<'a> GradeLoader<'a> {
    /// Create a loader rooted at `grades_dir`.
    pub fn new(grades_dir: impl Into<PathBuf>, dataset: &'a DatasetConfig) -> Self {
        Self {
            grades_dir: grades_dir.into(),
            dataset,
        }
    }

    /// Path of the grade file for one (model, topic) pair.
    pub fn grade_path(&self, model: &str, topic: &str) -> PathBuf {
        self.grades_dir
            .join(format!("{}-{}-{}.csv", model, topic, self.dataset.run))
    }

    /// Load every (model, topic) file, model-major, into one table.
    pub fn load(&self) -> Result<CombinedTable, LoadError> {
        let mut table = CombinedTable::new(self.dataset.categories.clone());

        for model in &self.dataset.models {
            for topic in &self.dataset.topics {
                let path = self.grade_path(&model.id, topic);
                let records = self.read_file(&path, &model.id, &topic.to_uppercase())?;
                debug!("Read {} rows from {}", records.len(), path.display());

                table.records.extend(records);
                table.sources.push(path);
            }
        }

        info!(
            "Loaded {} score records from {} files",
            table.len(),
            table.sources.len()
        );
        Ok(table)
    }

    /// Read one grade file, tagging each row with its model and topic.
    fn read_file(
        &self,
        path: &Path,
        model: &str,
        topic: &str,
    ) -> Result<Vec<ScoreRecord>, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let csv_err = |source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);
        let headers = reader.headers().map_err(csv_err)?.clone();

        let mut score_columns = Vec::with_capacity(self.dataset.categories.len());
        for category in &self.dataset.categories {
            let idx = headers
                .iter()
                .position(|h| h == category)
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column: category.clone(),
                })?;
            score_columns.push(idx);
        }

        let extra_columns: Vec<(usize, &str)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| !score_columns.contains(idx) && !TAG_COLUMNS.contains(name))
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_err)?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            let mut scores = Vec::with_capacity(score_columns.len());
            for (&idx, category) in score_columns.iter().zip(&self.dataset.categories) {
                let raw = row.get(idx).unwrap_or("").trim();
                let value = parse_score(raw).ok_or_else(|| LoadError::InvalidScore {
                    path: path.to_path_buf(),
                    line,
                    column: category.clone(),
                    value: raw.to_string(),
                })?;
                scores.push(value);
            }

            let extras = extra_columns
                .iter()
                .map(|&(idx, name)| (name.to_string(), row.get(idx).unwrap_or("").to_string()))
                .collect();

            records.push(ScoreRecord {
                model: model.to_string(),
                topic: topic.to_string(),
                scores,
                extras,
            });
        }

        Ok(records)
    }
}

fn parse_score(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Run,Correctness,Completeness,Visualization & Examples,Notes";

    fn write_grades(dir: &Path, dataset: &DatasetConfig, rows: &str) {
        for model in &dataset.models {
            for topic in &dataset.topics {
                let path = dir.join(format!("{}-{}-{}.csv", model.id, topic, dataset.run));
                fs::write(path, format!("{}\n{}", HEADER, rows)).unwrap();
            }
        }
    }

    #[test]
    fn test_grade_path() {
        let dataset = DatasetConfig::default();
        let loader = GradeLoader::new("grades", &dataset);
        assert_eq!(
            loader.grade_path("openai", "bfs"),
            PathBuf::from("grades/openai-bfs-01.csv")
        );
    }

    #[test]
    fn test_load_tags_and_orders_rows() {
        let dir = TempDir::new().unwrap();
        let dataset = DatasetConfig::default();
        write_grades(dir.path(), &dataset, "1,2,1,0,fine\n2,1.5,0.5,1,\n");

        let table = GradeLoader::new(dir.path(), &dataset).load().unwrap();

        assert_eq!(table.len(), 12);
        assert_eq!(table.sources.len(), 6);
        assert_eq!(table.records[0].model, "anthropic");
        assert_eq!(table.records[0].topic, "BFS");
        assert_eq!(table.records[2].topic, "DFS");
        assert_eq!(table.records[11].model, "openai");
        assert_eq!(table.records[1].scores, vec![1.5, 0.5, 1.0]);
        assert_eq!(
            table.records[0].extras,
            vec![
                ("Run".to_string(), "1".to_string()),
                ("Notes".to_string(), "fine".to_string()),
            ]
        );
    }

    #[test]
    fn test_source_tag_columns_are_superseded() {
        let dir = TempDir::new().unwrap();
        let mut dataset = DatasetConfig::default();
        dataset.models.truncate(1);
        dataset.topics = vec!["bfs".to_string()];
        fs::write(
            dir.path().join("anthropic-bfs-01.csv"),
            "Model,Topic,Correctness,Completeness,Visualization & Examples\nother,xyz,1,1,1\n",
        )
        .unwrap();

        let table = GradeLoader::new(dir.path(), &dataset).load().unwrap();

        assert_eq!(table.records[0].model, "anthropic");
        assert_eq!(table.records[0].topic, "BFS");
        assert!(table.records[0].extras.is_empty());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let dataset = DatasetConfig::default();
        write_grades(dir.path(), &dataset, "1,2,1,0,\n");
        fs::remove_file(dir.path().join("openai-bfs-01.csv")).unwrap();

        let err = GradeLoader::new(dir.path(), &dataset).load().unwrap_err();
        match err {
            LoadError::Open { path, .. } => assert!(path.ends_with("openai-bfs-01.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column_fails() {
        let dir = TempDir::new().unwrap();
        let mut dataset = DatasetConfig::default();
        dataset.models.truncate(1);
        dataset.topics.truncate(1);
        fs::write(
            dir.path().join("anthropic-bfs-01.csv"),
            "Correctness,Completeness\n1,1\n",
        )
        .unwrap();

        let err = GradeLoader::new(dir.path(), &dataset).load().unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn { ref column, .. } if column == "Visualization & Examples"
        ));
    }

    #[test]
    fn test_non_numeric_score_fails() {
        let dir = TempDir::new().unwrap();
        let dataset = DatasetConfig::default();
        write_grades(dir.path(), &dataset, "1,two,1,0,\n");

        let err = GradeLoader::new(dir.path(), &dataset).load().unwrap_err();
        assert!(matches!(err, LoadError::InvalidScore { line: 2, .. }));
    }

    #[test]
    fn test_ragged_row_fails() {
        let dir = TempDir::new().unwrap();
        let dataset = DatasetConfig::default();
        write_grades(dir.path(), &dataset, "1,2,1\n");

        let err = GradeLoader::new(dir.path(), &dataset).load().unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }
}
