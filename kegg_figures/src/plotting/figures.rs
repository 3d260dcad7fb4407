use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::analysis::gene_sets::GeneIncidence;
use crate::config::LayoutConfig;
use crate::models::{render_err, EnrichmentRow, FigureResult};
use crate::plotting::bar_panel::{
    draw_bar_panel, label_area_width, plan_bar_panel, title_height, x_axis_height, BarPanel,
};
use crate::plotting::heatmap_panel::{
    draw_heatmap_panel, gene_header_height, plan_heatmap_panel, HeatmapPanel,
};
use crate::plotting::{PanelFrame, PanelRows, PX_PER_INCH};

const MARGIN: u32 = 15;

/// A figure drawn to SVG.
#[derive(Debug, Clone)]
pub struct RenderedFigure {
    pub svg: String,
    pub width_px: u32,
    pub height_px: u32,
}

/// Draw the bar chart for `rows` (already ranked), adding the gene heatmap
/// to its right when an incidence matrix is given.
pub fn render_figure(
    layout: &LayoutConfig,
    rows: &[EnrichmentRow],
    incidence: Option<&GeneIncidence>,
) -> FigureResult<RenderedFigure> {
    let width_px = (layout.width_in * PX_PER_INCH).round() as u32;
    let height_px = (layout.height_in(rows.len()) * PX_PER_INCH).round() as u32;

    let bars = plan_bar_panel(
        rows,
        layout.title.as_deref(),
        layout.label_font_size,
        layout.value_font_size,
    );
    let heatmap = incidence.map(|inc| plan_heatmap_panel(inc, layout.gene_font_size));

    let mut svg = String::new();
    let drawn = {
        let root = SVGBackend::with_string(&mut svg, (width_px, height_px)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let drawn = draw_panels(&root, layout.bar_panel_fraction, &bars, heatmap.as_ref())?;
        root.present().map_err(render_err)?;
        drawn
    };

    let (bar_rows, gene_rows) = drawn;
    let p = bar_rows.plot;
    debug!(
        "Canvas {}x{} px; bars plotted in ({}, {})-({}, {})",
        width_px, height_px, p.x0, p.y0, p.x1, p.y1
    );
    if let Some(gene_rows) = gene_rows {
        let g = gene_rows.plot;
        debug!("Genes plotted in ({}, {})-({}, {})", g.x0, g.y0, g.x1, g.y1);
        debug_assert_eq!(gene_rows.centers, bar_rows.centers);
    }

    Ok(RenderedFigure {
        svg,
        width_px,
        height_px,
    })
}

/// Draw the bar panel, and the heatmap beside it when present. Both panels
/// reserve the same header and footer so their rows coincide.
fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    bar_fraction: f64,
    bars: &BarPanel,
    heatmap: Option<&HeatmapPanel>,
) -> FigureResult<(PanelRows, Option<PanelRows>)> {
    let label_width = label_area_width(root, bars)?;
    let mut header = title_height(bars.title.as_deref());
    if let Some(panel) = heatmap {
        header = header.max(gene_header_height(root, panel)?);
    }
    let frame = PanelFrame {
        margin: MARGIN,
        header,
        footer: x_axis_height(),
    };

    let Some(panel) = heatmap else {
        return Ok((draw_bar_panel(root, bars, frame, label_width)?, None));
    };

    // Panel widths split the space left after labels and margins.
    let (width, _) = root.dim_in_pixel();
    let axes_width = width.saturating_sub(label_width + 4 * MARGIN) as f64;
    let split = label_width + 2 * MARGIN + (axes_width * bar_fraction).round() as u32;
    let (left, right) = root.split_horizontally(split);

    let bar_rows = draw_bar_panel(&left, bars, frame, label_width)?;
    let gene_rows = draw_heatmap_panel(&right, panel, frame)?;
    Ok((bar_rows, Some(gene_rows)))
}
