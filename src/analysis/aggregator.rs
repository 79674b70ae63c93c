//! Score aggregation and statistics.
//!
//! This module groups score records by model and by (model, topic) and
//! computes per-category means, plus overall statistics across the
//! whole table.

use crate::models::{
    CategoryStats, CombinedTable, ModelAggregate, ModelCatalog, ModelTopicAggregate, ScoreRecord,
};
use tracing::debug;

/// Mean of every category over the given records.
///
/// Returns `None` for an empty group so that absent groups produce no row.
fn category_means<'a>(
    records: impl Iterator<Item = &'a ScoreRecord>,
    n_categories: usize,
) -> Option<Vec<f64>> {
    let mut sums = vec![0.0; n_categories];
    let mut count = 0usize;

    for record in records {
        for (sum, score) in sums.iter_mut().zip(&record.scores) {
            *sum += score;
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some(sums.into_iter().map(|s| s / count as f64).collect())
}

/// Average scores per model across all topics, in catalog order.
pub fn aggregate_by_model(table: &CombinedTable, catalog: &ModelCatalog) -> Vec<ModelAggregate> {
    let n = table.categories.len();

    catalog
        .ids()
        .filter_map(|model| {
            let rows = table.records.iter().filter(|r| r.model == model);
            category_means(rows, n).map(|means| ModelAggregate {
                model: model.to_string(),
                means,
            })
        })
        .collect()
}

/// Average scores per (model, topic) pair, model-major in catalog order.
///
/// `topics` are the uppercased topic labels stored on each record.
pub fn aggregate_by_model_topic(
    table: &CombinedTable,
    catalog: &ModelCatalog,
    topics: &[String],
) -> Vec<ModelTopicAggregate> {
    let n = table.categories.len();
    let mut out = Vec::with_capacity(catalog.len() * topics.len());

    for model in catalog.ids() {
        for topic in topics {
            let rows = table
                .records
                .iter()
                .filter(|r| r.model == model && &r.topic == topic);
            match category_means(rows, n) {
                Some(means) => out.push(ModelTopicAggregate {
                    model: model.to_string(),
                    topic: topic.clone(),
                    means,
                }),
                None => debug!("No records for {} ({}); group omitted", model, topic),
            }
        }
    }

    out
}

/// Overall mean, sample standard deviation, min and max per category.
pub fn category_stats(table: &CombinedTable) -> Vec<CategoryStats> {
    table
        .categories
        .iter()
        .enumerate()
        .map(|(idx, category)| {
            let values: Vec<f64> = table.column(idx).collect();
            describe(category, &values)
        })
        .collect()
}

fn describe(category: &str, values: &[f64]) -> CategoryStats {
    let n = values.len();
    let mean = if n == 0 {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / n as f64
    };

    // Sample (n - 1) deviation; undefined below two values.
    let std = if n < 2 {
        None
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    };

    let min = values.iter().copied().fold(f64::NAN, f64::min);
    let max = values.iter().copied().fold(f64::NAN, f64::max);

    CategoryStats {
        category: category.to_string(),
        mean,
        std,
        min,
        max,
    }
}
