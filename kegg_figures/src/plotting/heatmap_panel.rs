use plotters::chart::LabelAreaPosition;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analysis::gene_sets::GeneIncidence;
use crate::models::{render_err, FigureResult};
use crate::plotting::{
    bold_font, line_height, row_y, slot_at, slot_range, widest_text, PanelFrame, PanelRows,
    PixelRect, GRID_LIGHT, HEAT_FILL,
};

const CELL_FRACTION: f64 = 0.7;
const LABEL_GAP: u32 = 8;
const AXIS_TITLE_POINTS: u32 = 13;

pub const GENE_AXIS_LABEL: &str = "Related Genes";

/// A filled membership square: pathway `row` contains gene `col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatCell {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPanel {
    pub genes: Vec<String>,
    pub rows: usize,
    pub cells: Vec<HeatCell>,
    pub gene_points: u32,
}

impl HeatmapPanel {
    fn gene_at(&self, x: f64) -> String {
        slot_at(x, self.genes.len())
            .map(|j| self.genes[j].clone())
            .unwrap_or_default()
    }
}

pub fn plan_heatmap_panel(incidence: &GeneIncidence, gene_points: u32) -> HeatmapPanel {
    let (rows, cols) = incidence.matrix.dim();
    let mut cells = Vec::with_capacity(incidence.filled_cells());
    for row in 0..rows {
        for col in 0..cols {
            if incidence.contains(row, col) {
                cells.push(HeatCell { row, col });
            }
        }
    }

    HeatmapPanel {
        genes: incidence.genes.clone(),
        rows,
        cells,
        gene_points,
    }
}

/// Space above the matrix for the rotated gene labels and the axis title.
pub fn gene_header_height<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &HeatmapPanel,
) -> FigureResult<u32> {
    let style = TextStyle::from(bold_font(panel.gene_points));
    let longest = widest_text(area, panel.genes.iter().map(String::as_str), &style)?;
    Ok(longest + 3 * LABEL_GAP + line_height(AXIS_TITLE_POINTS))
}

pub fn draw_heatmap_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &HeatmapPanel,
    frame: PanelFrame,
) -> FigureResult<PanelRows> {
    let n_genes = panel.genes.len();
    let (x_range, y_range) = (slot_range(n_genes), slot_range(panel.rows));

    let mut chart = ChartBuilder::on(area)
        .margin(frame.margin)
        .margin_bottom(frame.margin + frame.footer)
        .set_label_area_size(LabelAreaPosition::Top, frame.header)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(render_err)?;

    // Gene names read bottom-up above their column.
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_y_axis()
        .x_labels(n_genes.max(1))
        .x_label_formatter(&|x: &f64| panel.gene_at(*x))
        .x_label_style(
            bold_font(panel.gene_points)
                .transform(FontTransform::Rotate270)
                .color(&BLACK),
        )
        .x_desc(GENE_AXIS_LABEL)
        .axis_desc_style(bold_font(AXIS_TITLE_POINTS))
        .draw()
        .map_err(render_err)?;

    let grid = GRID_LIGHT.stroke_width(1);
    chart
        .draw_series((0..panel.rows).map(|i| {
            let y = row_y(i, panel.rows);
            PathElement::new(vec![(x_range.start, y), (x_range.end, y)], grid)
        }))
        .map_err(render_err)?;
    chart
        .draw_series((0..=n_genes).map(|j| {
            let x = j as f64 - 0.5;
            PathElement::new(vec![(x, y_range.start), (x, y_range.end)], grid)
        }))
        .map_err(render_err)?;

    let half = CELL_FRACTION / 2.0;
    let corners = |c: &HeatCell| {
        let (x, y) = (c.col as f64, row_y(c.row, panel.rows));
        [(x - half, y - half), (x + half, y + half)]
    };
    chart
        .draw_series(
            panel
                .cells
                .iter()
                .map(|c| Rectangle::new(corners(c), HEAT_FILL.filled())),
        )
        .map_err(render_err)?;
    chart
        .draw_series(
            panel
                .cells
                .iter()
                .map(|c| Rectangle::new(corners(c), WHITE.stroke_width(1))),
        )
        .map_err(render_err)?;

    let centers = (0..panel.rows)
        .map(|i| chart.backend_coord(&(0.0, row_y(i, panel.rows))).1)
        .collect();
    Ok(PanelRows {
        plot: PixelRect::of_area(chart.plotting_area()),
        centers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrichmentRow;

    fn row(term: &str, genes: &[&str]) -> EnrichmentRow {
        EnrichmentRow {
            term_name: term.to_string(),
            score: 1.0,
            genes: genes.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn panel() -> (GeneIncidence, HeatmapPanel) {
        let rows = vec![
            row("VEGF signaling pathway", &["VEGFA", "KDR", "FLT1"]),
            row("HIF-1 signaling pathway", &["VEGFA", "EGFR"]),
        ];
        let incidence = GeneIncidence::from_rows(&rows);
        let panel = plan_heatmap_panel(&incidence, 14);
        (incidence, panel)
    }

    #[test]
    fn one_cell_per_membership() {
        let (incidence, panel) = panel();
        assert_eq!(panel.rows, 2);
        assert_eq!(panel.cells.len(), 5);
        assert!(panel.cells.iter().all(|c| incidence.contains(c.row, c.col)));
        assert_eq!(panel.gene_at(0.0), "EGFR");
        assert_eq!(panel.gene_at(3.0), "VEGFA");
        assert_eq!(panel.gene_at(4.0), "");
    }

    #[test]
    fn draws_gene_labels_above_the_matrix() {
        let (_, panel) = panel();
        let mut svg = String::new();
        let drawn = {
            let root = SVGBackend::with_string(&mut svg, (500, 400)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            let header = gene_header_height(&root, &panel).unwrap();
            let frame = PanelFrame {
                margin: 10,
                header,
                footer: 50,
            };
            let drawn = draw_heatmap_panel(&root, &panel, frame).unwrap();
            root.present().unwrap();
            assert_eq!(drawn.plot.y0, (frame.margin + header) as i32);
            drawn
        };

        assert_eq!(drawn.centers.len(), 2);
        assert!(drawn.centers[0] < drawn.centers[1]);
        for needle in ["KDR", "FLT1", "VEGFA", GENE_AXIS_LABEL] {
            assert!(svg.contains(needle), "missing {needle}");
        }
    }
}
