//! PNG chart rendering.
//!
//! Two figures are produced with plotters' bitmap backend: a grouped bar
//! chart of per-model averages and a heatmap of per-(model, topic)
//! averages. Drawing code is generic over the backend so it can also be
//! rendered into an in-memory buffer.

pub mod bar;
pub mod heatmap;
pub mod palette;

pub use bar::OverallChart;
pub use heatmap::HeatmapChart;

use crate::config::ChartsConfig;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while writing a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("figures directory {0} does not exist")]
    MissingOutputDir(PathBuf),

    #[error("failed to render {path}: {message}")]
    Draw { path: PathBuf, message: String },
}

/// Maps any plotters error to a [`RenderError`] for `path`.
fn draw_err<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> RenderError + '_ {
    move |err| RenderError::Draw {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Fail early when the output directory is missing; it is never created.
pub fn ensure_output_dir(dir: &Path) -> Result<(), RenderError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(RenderError::MissingOutputDir(dir.to_path_buf()))
    }
}

/// Pixel geometry of one figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    px_per_pt: f64,
    base_pt: f64,
}

impl Canvas {
    /// Canvas for a figure of `size_in` inches at the configured dpi.
    pub fn new(size_in: (f64, f64), charts: &ChartsConfig) -> Self {
        let dpi = f64::from(charts.dpi);
        Self {
            width: (size_in.0 * dpi).round().max(1.0) as u32,
            height: (size_in.1 * dpi).round().max(1.0) as u32,
            px_per_pt: dpi / 72.0,
            base_pt: charts.font_pt,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Length in points, converted to pixels.
    pub fn pt(&self, pt: f64) -> i32 {
        (pt * self.px_per_pt).round() as i32
    }

    /// Regular font at `scale` times the base size.
    pub fn font(&self, scale: f64) -> FontDesc<'static> {
        (FontFamily::SansSerif, self.base_pt * scale * self.px_per_pt).into_font()
    }

    /// Bold font at `scale` times the base size.
    pub fn bold(&self, scale: f64) -> FontDesc<'static> {
        (
            FontFamily::SansSerif,
            self.base_pt * scale * self.px_per_pt,
            FontStyle::Bold,
        )
            .into_font()
    }
}

/// Text style anchored at `h`/`v`.
fn anchored<'a>(font: FontDesc<'a>, color: &RGBColor, h: HPos, v: VPos) -> TextStyle<'a> {
    font.color(color).pos(Pos::new(h, v))
}

/// Draw `text` along a baseline rising `angle_deg` from the horizontal,
/// ending at `anchor` (right-aligned).
///
/// The bitmap backend only rotates text by multiples of 90 degrees, so
/// glyphs are placed one by one along the slanted baseline.
fn draw_slanted_text<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    font: FontDesc<'_>,
    anchor: (i32, i32),
    angle_deg: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let style = anchored(font, &BLACK, HPos::Left, VPos::Top);
    let (total, _) = area.estimate_text_size(text, &style)?;
    let (sin, cos) = angle_deg.to_radians().sin_cos();

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            continue;
        }
        let advance = if idx == 0 {
            0
        } else {
            area.estimate_text_size(&text[..idx], &style)?.0
        };
        let back = f64::from(total.saturating_sub(advance));
        let x = f64::from(anchor.0) - back * cos;
        let y = f64::from(anchor.1) + back * sin;
        area.draw_text(
            &text[idx..idx + ch.len_utf8()],
            &style,
            (x.round() as i32, y.round() as i32),
        )?;
    }

    Ok(())
}

/// Widest rendered label, in pixels.
fn max_text_width<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    labels: impl IntoIterator<Item = impl AsRef<str>>,
    style: &TextStyle<'_>,
) -> Result<u32, DrawingAreaErrorKind<DB::ErrorType>> {
    let mut widest = 0;
    for label in labels {
        widest = widest.max(area.estimate_text_size(label.as_ref(), style)?.0);
    }
    Ok(widest)
}

/// Bold axis titles centred on the plot's pixel ranges: the x title at
/// `x_title_y`, the y title (reading bottom to top) at `y_title_x`.
fn draw_axis_titles<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    canvas: &Canvas,
    plot: (std::ops::Range<i32>, std::ops::Range<i32>),
    (x_title, x_title_y): (&str, i32),
    (y_title, y_title_x): (&str, i32),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (xs, ys) = plot;
    let x_style = anchored(canvas.bold(1.0), &BLACK, HPos::Center, VPos::Bottom);
    root.draw_text(x_title, &x_style, ((xs.start + xs.end) / 2, x_title_y))?;

    let y_style = anchored(
        canvas.bold(1.0).transform(FontTransform::Rotate270),
        &BLACK,
        HPos::Center,
        VPos::Top,
    );
    root.draw_text(y_title, &y_style, (y_title_x, (ys.start + ys.end) / 2))?;
    Ok(())
}
