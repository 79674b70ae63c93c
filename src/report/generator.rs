//! Text and JSON report generation.
//!
//! The text report is what the tool prints on stdout. It contains no
//! timestamps and iterates only ordered collections, so identical input
//! yields byte-identical output.

use crate::models::{
    CategoryStats, CombinedTable, ModelAggregate, ModelTopicAggregate, Summary, SummaryMetadata,
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;
use std::path::Path;

const BANNER_WIDTH: usize = 60;

/// Generate the complete text report.
pub fn generate_text_report(
    categories: &[String],
    by_model: &[ModelAggregate],
    by_model_topic: &[ModelTopicAggregate],
    stats: &[CategoryStats],
) -> String {
    let mut output = String::new();

    output.push_str(&generate_heading("Average Scores by Model", false));
    output.push('\n');
    output.push_str(&generate_model_table(categories, by_model));

    output.push_str(&generate_heading("Average Scores by Model and Topic", true));
    output.push('\n');
    output.push_str(&generate_model_topic_table(categories, by_model_topic));

    output.push_str(&generate_heading("Overall Statistics", true));
    output.push_str(&generate_stats_section(stats));

    output
}

/// Banner, title, banner. `leading_gap` puts an empty line before it.
fn generate_heading(title: &str, leading_gap: bool) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let gap = if leading_gap { "\n" } else { "" };
    format!("{gap}{banner}\n{title}\n{banner}\n")
}

/// Two-decimal rendering; undefined values print as `nan`.
pub fn format_score(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Render rows as a plain aligned table.
///
/// The first `left` columns are left-aligned labels, the rest are
/// right-aligned values.
fn render_table(headers: &[String], rows: &[Vec<String>], left: usize) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_row = |cells: &[String]| {
        let parts: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(idx, (cell, &width))| {
                if idx < left {
                    format!("{:<width$}", cell)
                } else {
                    format!("{:>width$}", cell)
                }
            })
            .collect();
        format!("{}\n", parts.join("  ").trim_end())
    };

    let mut table = render_row(headers);
    for row in rows {
        table.push_str(&render_row(row.as_slice()));
    }
    table
}

/// Generate the per-model average table.
fn generate_model_table(categories: &[String], by_model: &[ModelAggregate]) -> String {
    let headers: Vec<String> = std::iter::once("Model".to_string())
        .chain(categories.iter().cloned())
        .collect();

    let rows: Vec<Vec<String>> = by_model
        .iter()
        .map(|agg| {
            std::iter::once(agg.model.clone())
                .chain(agg.means.iter().map(|&m| format_score(m)))
                .collect()
        })
        .collect();

    render_table(&headers, &rows, 1)
}

/// Generate the per-(model, topic) average table.
fn generate_model_topic_table(categories: &[String], by_pair: &[ModelTopicAggregate]) -> String {
    let headers: Vec<String> = ["Model".to_string(), "Topic".to_string()]
        .into_iter()
        .chain(categories.iter().cloned())
        .collect();

    let rows: Vec<Vec<String>> = by_pair
        .iter()
        .map(|agg| {
            [agg.model.clone(), agg.topic.clone()]
                .into_iter()
                .chain(agg.means.iter().map(|&m| format_score(m)))
                .collect()
        })
        .collect();

    render_table(&headers, &rows, 2)
}

/// Generate the overall per-category statistics.
fn generate_stats_section(stats: &[CategoryStats]) -> String {
    let mut section = String::new();

    for stat in stats {
        section.push_str(&format!("\n{}:\n", stat.category));
        section.push_str(&format!("  Mean: {}\n", format_score(stat.mean)));
        section.push_str(&format!(
            "  Std:  {}\n",
            format_score(stat.std.unwrap_or(f64::NAN))
        ));
        section.push_str(&format!("  Min:  {}\n", format_score(stat.min)));
        section.push_str(&format!("  Max:  {}\n", format_score(stat.max)));
    }

    section
}

/// Assemble the machine-readable summary.
pub fn build_summary(
    table: &CombinedTable,
    by_model: &[ModelAggregate],
    by_model_topic: &[ModelTopicAggregate],
    stats: &[CategoryStats],
) -> Summary {
    Summary {
        metadata: SummaryMetadata {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            rows: table.len(),
            files: table
                .sources
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        },
        categories: table.categories.clone(),
        by_model: by_model.to_vec(),
        by_model_topic: by_model_topic.to_vec(),
        overall: stats.to_vec(),
    }
}

/// Generate a JSON summary.
pub fn generate_json_summary(summary: &Summary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write a JSON summary to a file.
pub fn write_json_summary(summary: &Summary, path: &Path) -> Result<()> {
    let content = generate_json_summary(summary)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create summary file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write summary file {}", path.display()))?;

    Ok(())
}
