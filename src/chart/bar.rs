//! Grouped bar chart of per-model averages.

use super::palette::series_color;
use super::{
    anchored, draw_axis_titles, draw_err, draw_slanted_text, max_text_width, Canvas, RenderError,
};
use crate::models::{ModelAggregate, ModelCatalog};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};
use std::path::Path;
use tracing::info;

const TITLE: &str = "Average Model Performance Across All Categories";
const X_TITLE: &str = "Categories";
const Y_TITLE: &str = "Average Score (0-2)";

/// Share of a category slot covered by its cluster of bars.
const GROUP_SPAN: f64 = 0.75;

/// Slant of the category labels, in degrees.
const LABEL_ANGLE: f64 = 15.0;

/// One cluster per category, one bar per model.
pub struct OverallChart<'a> {
    pub categories: &'a [String],
    pub by_model: &'a [ModelAggregate],
    pub catalog: &'a ModelCatalog,
    /// Upper bound of the y-axis.
    pub y_max: f64,
}

impl OverallChart<'_> {
    /// Render to a PNG file, overwriting it.
    pub fn render(&self, path: &Path, canvas: &Canvas) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, canvas.size()).into_drawing_area();
        self.draw(&root, canvas).map_err(draw_err(path))?;
        root.present().map_err(draw_err(path))?;

        info!("Wrote bar chart to {}", path.display());
        Ok(())
    }

    fn bar_width(&self) -> f64 {
        GROUP_SPAN / self.by_model.len().max(1) as f64
    }

    /// Horizontal extent of the bar for `model_idx` in category `cat`,
    /// with the cluster centred on the category tick.
    fn bar_span(&self, cat: usize, model_idx: usize) -> (f64, f64) {
        let width = self.bar_width();
        let n = self.by_model.len() as f64;
        let center = cat as f64 + (model_idx as f64 - (n - 1.0) / 2.0) * width;
        (center - width / 2.0, center + width / 2.0)
    }

    /// Labels of the lowest and highest y ticks, which bound the tick width.
    fn y_tick_extremes(&self) -> [String; 2] {
        ["0.0".to_string(), format!("{:.1}", self.y_max)]
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        canvas: &Canvas,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let margin = canvas.pt(8.0);
        let pad = canvas.pt(4.0);
        let label_font = canvas.font(1.0);
        let label_style = anchored(label_font.clone(), &BLACK, HPos::Left, VPos::Top);
        let title_style = anchored(canvas.bold(1.0), &BLACK, HPos::Left, VPos::Top);

        let (_, text_h) = root.estimate_text_size("Xg", &label_style)?;
        let (_, title_h) = root.estimate_text_size("Xg", &title_style)?;
        let widest = max_text_width(root, self.categories, &label_style)?;
        let tick_w = max_text_width(root, self.y_tick_extremes(), &label_style)?;

        let rise = (f64::from(widest) * LABEL_ANGLE.to_radians().sin()).ceil() as u32;
        let x_area = pad as u32 * 3 + rise + text_h + title_h;
        let y_area = pad as u32 * 3 + tick_w + title_h;

        let n_cat = self.categories.len() as f64;
        let mut chart = ChartBuilder::on(root)
            .caption(TITLE, canvas.bold(1.2))
            .margin(margin)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area)
            .build_cartesian_2d(-0.5..(n_cat - 0.5), 0.0..self.y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_labels(12)
            .y_label_formatter(&|v| format!("{:.1}", v))
            .label_style(label_font.clone())
            .bold_line_style(BLACK.mix(0.3))
            .light_line_style(TRANSPARENT)
            .draw()?;

        let legend_half = canvas.pt(4.0);
        for (idx, agg) in self.by_model.iter().enumerate() {
            let color = series_color(idx);
            let name = self
                .catalog
                .display_name(&agg.model)
                .unwrap_or(&agg.model)
                .to_string();

            chart
                .draw_series(agg.means.iter().enumerate().map(|(cat, &mean)| {
                    let (x0, x1) = self.bar_span(cat, idx);
                    Rectangle::new([(x0, 0.0), (x1, mean)], color.filled())
                }))?
                .label(name)
                .legend(move |(x, y)| {
                    Rectangle::new(
                        [(x, y - legend_half), (x + 2 * legend_half, y + legend_half)],
                        color.filled(),
                    )
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .margin(pad)
            .legend_area_size(canvas.pt(14.0))
            .label_font(label_font.clone())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .draw()?;

        for (cat, label) in self.categories.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(cat as f64, 0.0));
            draw_slanted_text(root, label, label_font.clone(), (x, y + pad), LABEL_ANGLE)?;
        }

        let (_, height) = root.dim_in_pixel();
        draw_axis_titles(
            root,
            canvas,
            chart.plotting_area().get_pixel_range(),
            (X_TITLE, height as i32 - margin),
            (Y_TITLE, margin),
        )?;

        Ok(())
    }
}
