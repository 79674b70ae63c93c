//! Colours: the categorical bar palette and the heatmap colour scale.

use plotters::style::RGBColor;

/// Categorical series colours, cycled by model index.
pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Yellow-green-blue sequential scheme, light to dark.
const YL_GN_BU: [RGBColor; 9] = [
    RGBColor(255, 255, 217),
    RGBColor(237, 248, 177),
    RGBColor(199, 233, 180),
    RGBColor(127, 205, 187),
    RGBColor(65, 182, 196),
    RGBColor(29, 145, 192),
    RGBColor(34, 94, 168),
    RGBColor(37, 52, 148),
    RGBColor(8, 29, 88),
];

/// Annotation colour on light cells.
pub const DARK_TEXT: RGBColor = RGBColor(38, 38, 38);

/// Annotation colour on dark cells.
pub const LIGHT_TEXT: RGBColor = RGBColor(255, 255, 255);

pub fn series_color(idx: usize) -> RGBColor {
    TAB10[idx % TAB10.len()]
}

/// Linear colour scale over a fixed value range. Values outside the
/// range are clamped to its ends.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    stops: &'static [RGBColor],
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn yl_gn_bu(min: f64, max: f64) -> Self {
        Self {
            stops: &YL_GN_BU,
            min,
            max,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn color_at(&self, value: f64) -> RGBColor {
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let pos = t * (self.stops.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(self.stops.len() - 1);
        let frac = pos - lo as f64;

        let (a, b) = (self.stops[lo], self.stops[hi]);
        let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
        RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// WCAG relative luminance of an sRGB colour.
fn relative_luminance(color: RGBColor) -> f64 {
    let channel = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * channel(color.0) + 0.7152 * channel(color.1) + 0.0722 * channel(color.2)
}

/// Readable annotation colour for a cell background.
pub fn text_color_for(background: RGBColor) -> RGBColor {
    if relative_luminance(background) > 0.408 {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}
