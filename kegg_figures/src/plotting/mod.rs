//! Figure rendering. Each panel is planned as plain data first, then drawn as a
//! plotters chart on an SVG backend. Panels of one figure share a row axis:
//! rank 0 sits on the top row.

pub mod bar_panel;
pub mod export;
pub mod figures;
pub mod heatmap_panel;

use std::ops::Range;

use plotters::coord::{CoordTranslate, Shift};
use plotters::prelude::*;

use crate::models::{render_err, FigureResult};

/// SVG user units per inch; PNG export scales this up to the requested DPI.
pub const PX_PER_INCH: f64 = 100.0;

pub const BAR_EDGE: RGBColor = RGBColor(0x2c, 0x5f, 0x77);
pub const HEAT_FILL: RGBColor = RGBColor(0x2c, 0x3e, 0x50);
pub const GRID_LIGHT: RGBColor = RGBColor(0xe0, 0xe0, 0xe0);
pub const GRID_MAJOR: RGBColor = RGBColor(0xb3, 0xb3, 0xb3);

const FONT_FAMILY: &str = "sans-serif";

// ColorBrewer YlGnBu, the nine anchors of the sequential scale.
const YLGNBU: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xd9),
    (0xed, 0xf8, 0xb1),
    (0xc7, 0xe9, 0xb4),
    (0x7f, 0xcd, 0xbb),
    (0x41, 0xb6, 0xc4),
    (0x1d, 0x91, 0xc0),
    (0x22, 0x5e, 0xa8),
    (0x25, 0x34, 0x94),
    (0x08, 0x1d, 0x58),
];

/// Axis-aligned rectangle in backend pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    /// The pixel extent of a drawing area, e.g. a chart's plotting area.
    pub fn of_area<DB: DrawingBackend, CT: CoordTranslate>(area: &DrawingArea<DB, CT>) -> Self {
        let (x, y) = area.get_pixel_range();
        PixelRect {
            x0: x.start,
            y0: y.start,
            x1: x.end,
            y1: y.end,
        }
    }
}

/// Space reserved around the plotting area of every panel in a figure, so
/// that side-by-side panels put their rows on the same pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelFrame {
    pub margin: u32,
    /// Above the plot: title or gene labels.
    pub header: u32,
    /// Below the plot: score ticks and axis title.
    pub footer: u32,
}

/// Where a drawn panel ended up on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRows {
    pub plot: PixelRect,
    /// Pixel y of each row centre, in rank order.
    pub centers: Vec<i32>,
}

/// Chart y of the row holding `rank`; the top row is rank 0.
pub fn row_y(rank: usize, rows: usize) -> f64 {
    rows.saturating_sub(rank + 1) as f64
}

/// Chart range with one unit-wide slot per item, centred on the integers.
pub fn slot_range(items: usize) -> Range<f64> {
    -0.5..(items.max(1) as f64 - 0.5)
}

/// Index of the slot centred on `value`, if it is one.
pub fn slot_at(value: f64, items: usize) -> Option<usize> {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= items as f64 {
        return None;
    }
    Some(rounded as usize)
}

/// Sample the YlGnBu scale at `t` in [0, 1] by linear interpolation.
pub fn ylgnbu(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (YLGNBU.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(YLGNBU.len() - 1);
    let frac = pos - lo as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (YLGNBU[lo], YLGNBU[hi]);
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Bar fill: the upper 60% of YlGnBu, scaled by score relative to the maximum.
pub fn score_color(score: f64, max_score: f64) -> RGBColor {
    let norm = if max_score > 0.0 { score / max_score } else { 0.0 };
    ylgnbu(0.4 + 0.6 * norm)
}

/// Point size to backend pixels.
pub fn font_px(points: u32) -> f64 {
    points as f64 * PX_PER_INCH / 72.0
}

pub fn font(points: u32) -> FontDesc<'static> {
    (FONT_FAMILY, font_px(points)).into_font()
}

pub fn bold_font(points: u32) -> FontDesc<'static> {
    font(points).style(FontStyle::Bold)
}

pub fn line_height(points: u32) -> u32 {
    (font_px(points) * 1.3).ceil() as u32
}

/// Widest of `texts` when set in `style`, in pixels.
pub fn widest_text<'a, DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    texts: impl IntoIterator<Item = &'a str>,
    style: &TextStyle,
) -> FigureResult<u32> {
    let mut widest = 0;
    for text in texts {
        let (w, _) = area.estimate_text_size(text, style).map_err(render_err)?;
        widest = widest.max(w);
    }
    Ok(widest)
}
