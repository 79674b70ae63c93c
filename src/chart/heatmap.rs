//! Heatmap of per-(model, topic) averages with a colour bar.

use super::palette::{text_color_for, ColorScale};
use super::{anchored, draw_axis_titles, draw_err, max_text_width, Canvas, RenderError};
use crate::models::{ModelCatalog, ModelTopicAggregate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};
use std::path::Path;
use tracing::info;

const TITLE: &str = "Heatmap: Average Scores by Model and Topic";
const X_TITLE: &str = "Categories";
const Y_TITLE: &str = "Model - Topic";
const SCALE_TITLE: &str = "Score (0-2)";

/// Number of intervals between colour bar ticks.
const SCALE_TICKS: usize = 8;

/// One row per (model, topic) aggregate, one column per category.
pub struct HeatmapChart<'a> {
    pub categories: &'a [String],
    pub by_model_topic: &'a [ModelTopicAggregate],
    pub catalog: &'a ModelCatalog,
    pub scale: ColorScale,
}

impl HeatmapChart<'_> {
    /// Render to a PNG file, overwriting it.
    pub fn render(&self, path: &Path, canvas: &Canvas) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, canvas.size()).into_drawing_area();
        self.draw(&root, canvas).map_err(draw_err(path))?;
        root.present().map_err(draw_err(path))?;

        info!("Wrote heatmap to {}", path.display());
        Ok(())
    }

    /// Row labels, top to bottom: `"{short name} ({TOPIC})"`.
    pub fn row_labels(&self) -> Vec<String> {
        self.by_model_topic
            .iter()
            .map(|agg| {
                let short = self.catalog.short_name(&agg.model).unwrap_or(&agg.model);
                format!("{} ({})", short, agg.topic)
            })
            .collect()
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        canvas: &Canvas,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let rows = self.row_labels();
        let n_rows = rows.len().max(1) as f64;
        let n_cols = self.categories.len().max(1) as f64;

        let margin = canvas.pt(8.0);
        let pad = canvas.pt(4.0);
        let bar_gap = canvas.pt(10.0);
        let bar_width = canvas.pt(12.0);
        let tick_len = canvas.pt(3.0);

        let font = canvas.font(1.0);
        let measure = anchored(font.clone(), &BLACK, HPos::Left, VPos::Top);
        let (_, text_h) = root.estimate_text_size("Xg", &measure)?;
        let (_, title_h) = root.estimate_text_size(
            "Xg",
            &anchored(canvas.bold(1.0), &BLACK, HPos::Left, VPos::Top),
        )?;
        let row_w = max_text_width(root, &rows, &measure)?;
        let tick_labels = self.tick_labels();
        let tick_w = max_text_width(root, &tick_labels, &measure)?;

        let pad_u = pad as u32;
        let x_area = pad_u * 3 + text_h + title_h;
        let y_area = pad_u * 3 + row_w + title_h;
        let right_area = (bar_gap + bar_width + tick_len) as u32 + pad_u * 3 + tick_w + text_h;

        let mut chart = ChartBuilder::on(root)
            .caption(TITLE, canvas.bold(1.2))
            .margin(margin)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area)
            .right_y_label_area_size(right_area)
            .build_cartesian_2d(0.0..n_cols, 0.0..n_rows)?;

        // Row i sits in the band [n - i - 1, n - i] so the first row is on top.
        let band = |row: usize| n_rows - row as f64;

        chart.draw_series(self.by_model_topic.iter().enumerate().flat_map(|(row, agg)| {
            agg.means.iter().enumerate().map(move |(col, &mean)| {
                Rectangle::new(
                    [(col as f64, band(row) - 1.0), (col as f64 + 1.0, band(row))],
                    self.scale.color_at(mean).filled(),
                )
            })
        }))?;

        for (row, agg) in self.by_model_topic.iter().enumerate() {
            for (col, &mean) in agg.means.iter().enumerate() {
                let fg = text_color_for(self.scale.color_at(mean));
                let style = anchored(font.clone(), &fg, HPos::Center, VPos::Center);
                let center = chart.backend_coord(&(col as f64 + 0.5, band(row) - 0.5));
                root.draw_text(&format!("{:.2}", mean), &style, center)?;
            }
        }

        let col_style = anchored(font.clone(), &BLACK, HPos::Center, VPos::Top);
        for (col, label) in self.categories.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(col as f64 + 0.5, 0.0));
            root.draw_text(label, &col_style, (x, y + pad))?;
        }

        let (xs, ys) = chart.plotting_area().get_pixel_range();
        let row_style = anchored(font.clone(), &BLACK, HPos::Right, VPos::Center);
        for (row, label) in rows.iter().enumerate() {
            let (_, y) = chart.backend_coord(&(0.0, band(row) - 0.5));
            root.draw_text(label, &row_style, (xs.start - pad, y))?;
        }

        let bar_x = xs.end + bar_gap;
        self.draw_color_bar(
            root,
            canvas,
            (bar_x..bar_x + bar_width, ys.clone()),
            &tick_labels,
        )?;

        let (_, height) = root.dim_in_pixel();
        draw_axis_titles(
            root,
            canvas,
            (xs, ys),
            (X_TITLE, height as i32 - margin),
            (Y_TITLE, margin),
        )?;

        Ok(())
    }

    fn tick_labels(&self) -> Vec<String> {
        (0..=SCALE_TICKS)
            .map(|i| format!("{:.2}", self.tick_value(i)))
            .collect()
    }

    fn tick_value(&self, i: usize) -> f64 {
        let (min, max) = (self.scale.min(), self.scale.max());
        min + (max - min) * i as f64 / SCALE_TICKS as f64
    }

    /// Vertical colour bar, maximum at the top, ticks and title on its right.
    fn draw_color_bar<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        canvas: &Canvas,
        (xs, ys): (std::ops::Range<i32>, std::ops::Range<i32>),
        tick_labels: &[String],
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let (min, max) = (self.scale.min(), self.scale.max());
        let span = f64::from((ys.end - ys.start - 1).max(1));
        let to_y = |v: f64| ys.end - 1 - ((v - min) / (max - min) * span).round() as i32;

        for py in ys.clone() {
            let value = max - f64::from(py - ys.start) / span * (max - min);
            root.draw(&Rectangle::new(
                [(xs.start, py), (xs.end, py + 1)],
                self.scale.color_at(value).filled(),
            ))?;
        }
        root.draw(&Rectangle::new(
            [(xs.start, ys.start), (xs.end, ys.end - 1)],
            BLACK.mix(0.3),
        ))?;

        let pad = canvas.pt(4.0);
        let tick_len = canvas.pt(3.0);
        let tick_style = anchored(canvas.font(1.0), &BLACK, HPos::Left, VPos::Center);
        for (i, label) in tick_labels.iter().enumerate() {
            let y = to_y(self.tick_value(i));
            root.draw(&PathElement::new(
                vec![(xs.end, y), (xs.end + tick_len, y)],
                BLACK,
            ))?;
            root.draw_text(label, &tick_style, (xs.end + tick_len + pad, y))?;
        }

        let measure = anchored(canvas.font(1.0), &BLACK, HPos::Left, VPos::Top);
        let tick_w = max_text_width(root, tick_labels, &measure)?;
        let title_style = anchored(
            canvas.font(1.0).transform(FontTransform::Rotate270),
            &BLACK,
            HPos::Center,
            VPos::Top,
        );
        root.draw_text(
            SCALE_TITLE,
            &title_style,
            (
                xs.end + tick_len + pad * 2 + tick_w as i32,
                (ys.start + ys.end) / 2,
            ),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartsConfig;
    use crate::models::ModelInfo;
    use tempfile::TempDir;

    fn catalog() -> ModelCatalog {
        ModelCatalog::new(vec![
            ModelInfo::new("anthropic", "Claude Sonnet 4.5", "Claude"),
            ModelInfo::new("openai", "ChatGPT-5.1", "ChatGPT"),
        ])
    }

    fn categories() -> Vec<String> {
        vec!["Correctness".to_string(), "Completeness".to_string()]
    }

    fn pair(model: &str, topic: &str, means: [f64; 2]) -> ModelTopicAggregate {
        ModelTopicAggregate {
            model: model.to_string(),
            topic: topic.to_string(),
            means: means.to_vec(),
        }
    }

    #[test]
    fn test_row_labels_use_short_names() {
        let categories = categories();
        let catalog = catalog();
        let pairs = vec![
            pair("anthropic", "BFS", [2.0, 1.0]),
            pair("openai", "DFS", [0.5, 1.5]),
            pair("mistral", "BFS", [1.0, 1.0]),
        ];
        let chart = HeatmapChart {
            categories: &categories,
            by_model_topic: &pairs,
            catalog: &catalog,
            scale: ColorScale::yl_gn_bu(0.0, 2.0),
        };

        assert_eq!(
            chart.row_labels(),
            vec!["Claude (BFS)", "ChatGPT (DFS)", "mistral (BFS)"]
        );
    }

    #[test]
    fn test_tick_labels_cover_scale() {
        let categories = categories();
        let catalog = catalog();
        let chart = HeatmapChart {
            categories: &categories,
            by_model_topic: &[],
            catalog: &catalog,
            scale: ColorScale::yl_gn_bu(0.0, 2.0),
        };

        let ticks = chart.tick_labels();
        assert_eq!(ticks.len(), 9);
        assert_eq!(ticks[0], "0.00");
        assert_eq!(ticks[1], "0.25");
        assert_eq!(ticks[8], "2.00");
    }

    #[test]
    fn test_render_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heatmap.png");
        let charts = ChartsConfig {
            dpi: 40,
            ..ChartsConfig::default()
        };
        let categories = categories();
        let catalog = catalog();
        let pairs = vec![
            pair("anthropic", "BFS", [2.0, 1.0]),
            pair("anthropic", "DFS", [1.5, 0.0]),
            pair("openai", "BFS", [0.5, 1.5]),
        ];
        let chart = HeatmapChart {
            categories: &categories,
            by_model_topic: &pairs,
            catalog: &catalog,
            scale: ColorScale::yl_gn_bu(charts.score_min, charts.score_max),
        };

        chart
            .render(&path, &Canvas::new(charts.heatmap_size, &charts))
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
