//! The report pipeline: load, aggregate, render, report.

use crate::analysis;
use crate::chart::{self, palette::ColorScale, Canvas, HeatmapChart, OverallChart};
use crate::config::Config;
use crate::loader::GradeLoader;
use crate::report;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Per-invocation switches that are not part of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Also write the JSON summary here.
    pub summary_json: Option<PathBuf>,
    /// Skip chart rendering.
    pub no_charts: bool,
}

/// Run the whole pipeline and return the text report.
///
/// Nothing is returned for printing unless every step succeeded, so a
/// failure never leaves a partial report on stdout.
pub fn run(config: &Config, options: &RunOptions) -> Result<String> {
    let dataset = &config.dataset;
    let catalog = dataset.catalog();
    let topics = dataset.topic_labels();

    let table = GradeLoader::new(&config.paths.grades_dir, dataset).load()?;
    if table.is_empty() {
        warn!("Grade files contain no rows; every aggregate will be empty");
    }

    let by_model = analysis::aggregate_by_model(&table, &catalog);
    let by_model_topic = analysis::aggregate_by_model_topic(&table, &catalog, &topics);
    let stats = analysis::category_stats(&table);
    debug!(
        "Aggregated {} models, {} model-topic groups",
        by_model.len(),
        by_model_topic.len()
    );

    let text = report::generate_text_report(&table.categories, &by_model, &by_model_topic, &stats);

    if options.no_charts {
        info!("Chart rendering skipped");
    } else {
        let paths = &config.paths;
        let charts = &config.charts;
        chart::ensure_output_dir(&paths.figures_dir)?;

        OverallChart {
            categories: &table.categories,
            by_model: &by_model,
            catalog: &catalog,
            y_max: charts.y_max,
        }
        .render(
            &paths.overall_path(),
            &Canvas::new(charts.overall_size, charts),
        )?;

        HeatmapChart {
            categories: &table.categories,
            by_model_topic: &by_model_topic,
            catalog: &catalog,
            scale: ColorScale::yl_gn_bu(charts.score_min, charts.score_max),
        }
        .render(
            &paths.heatmap_path(),
            &Canvas::new(charts.heatmap_size, charts),
        )?;
    }

    if let Some(ref path) = options.summary_json {
        let summary = report::build_summary(&table, &by_model, &by_model_topic, &stats);
        report::write_json_summary(&summary, path)?;
        info!("Wrote JSON summary to {}", path.display());
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const HEADER: &str = "Question,Correctness,Completeness,Visualization & Examples\n";

    fn write_grades(dir: &Path, body: &str, skip: Option<&str>) {
        for model in ["anthropic", "google", "openai"] {
            for topic in ["bfs", "dfs"] {
                let name = format!("{}-{}-01.csv", model, topic);
                if Some(name.as_str()) == skip {
                    continue;
                }
                fs::write(dir.join(name), format!("{HEADER}{body}")).unwrap();
            }
        }
    }

    fn setup(body: &str, skip: Option<&str>) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let grades = tmp.path().join("grades");
        let figures = tmp.path().join("figures");
        fs::create_dir(&grades).unwrap();
        fs::create_dir(&figures).unwrap();
        write_grades(&grades, body, skip);

        let mut config = Config::default();
        config.paths.grades_dir = grades;
        config.paths.figures_dir = figures;
        config.charts.dpi = 30;
        (tmp, config)
    }

    #[test]
    fn test_uniform_grades_report() {
        let (_tmp, config) = setup("q1,2,1,0\n", None);
        let options = RunOptions {
            no_charts: true,
            ..RunOptions::default()
        };

        let text = run(&config, &options).unwrap();

        for model in ["anthropic", "google", "openai"] {
            let row = text
                .lines()
                .find(|l| l.starts_with(model))
                .expect("model row");
            let values: Vec<&str> = row.split_whitespace().skip(1).collect();
            assert_eq!(values, vec!["2.00", "1.00", "0.00"]);
        }
        assert!(text.contains("\nCorrectness:\n  Mean: 2.00\n  Std:  0.00\n"));
        assert!(text.contains("  Min:  0.00\n  Max:  0.00\n"));
    }

    #[test]
    fn test_renders_both_figures() {
        let (_tmp, config) = setup("q1,2,1,0\nq2,1,1,2\n", None);

        run(&config, &RunOptions::default()).unwrap();

        assert!(config.paths.overall_path().is_file());
        assert!(config.paths.heatmap_path().is_file());
    }

    #[test]
    fn test_missing_file_aborts_before_output() {
        let (_tmp, config) = setup("q1,2,1,0\n", Some("openai-bfs-01.csv"));

        let err = run(&config, &RunOptions::default()).unwrap_err();

        match err.downcast_ref::<LoadError>() {
            Some(LoadError::Open { path, .. }) => {
                assert!(path.ends_with("openai-bfs-01.csv"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!config.paths.overall_path().exists());
        assert!(!config.paths.heatmap_path().exists());
    }

    #[test]
    fn test_missing_figures_dir_fails() {
        let (tmp, mut config) = setup("q1,2,1,0\n", None);
        config.paths.figures_dir = tmp.path().join("absent");

        let err = run(&config, &RunOptions::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<chart::RenderError>(),
            Some(chart::RenderError::MissingOutputDir(_))
        ));
        assert!(!tmp.path().join("absent").exists());
    }

    #[test]
    fn test_report_is_byte_identical_across_runs() {
        let (_tmp, config) = setup("q1,2,1,0\nq2,0,1,1\nq3,1,2,2\n", None);
        let options = RunOptions {
            no_charts: true,
            ..RunOptions::default()
        };

        let first = run(&config, &options).unwrap();
        let second = run(&config, &options).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_writes_json_summary() {
        let (tmp, config) = setup("q1,2,1,0\n", None);
        let path = tmp.path().join("summary.json");
        let options = RunOptions {
            summary_json: Some(path.clone()),
            no_charts: true,
        };

        run(&config, &options).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["metadata"]["rows"], 6);
        assert_eq!(json["by_model"].as_array().unwrap().len(), 3);
        assert_eq!(json["by_model_topic"].as_array().unwrap().len(), 6);
    }
}
