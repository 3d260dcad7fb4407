use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::models::{render_err, EnrichmentRow, FigureResult};
use crate::plotting::{
    bold_font, font, line_height, row_y, score_color, slot_at, slot_range, widest_text,
    PanelFrame, PanelRows, PixelRect, BAR_EDGE, GRID_MAJOR,
};

const BAR_HEIGHT: f64 = 0.7;
const VALUE_OFFSET: f64 = 0.02;
// Head room on the score axis so the value labels stay inside the plot.
const X_HEADROOM: f64 = 1.15;
const LABEL_GAP: u32 = 12;
const X_LABELS: usize = 6;
const AXIS_LABEL_POINTS: u32 = 15;
const TICK_POINTS: u32 = 11;
const TITLE_POINTS: u32 = 14;

pub const X_AXIS_LABEL: &str = "-log10(Padj)";

/// One horizontal bar in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BarMark {
    pub term_name: String,
    pub score: f64,
    pub value_label: String,
    pub fill: RGBColor,
    /// Row centre on the chart's y axis.
    pub y: f64,
    /// Left edge of the value label on the score axis.
    pub value_x: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPanel {
    pub bars: Vec<BarMark>,
    pub x_max: f64,
    pub title: Option<String>,
    pub label_points: u32,
    pub value_points: u32,
}

impl BarPanel {
    /// Pathway name for a y-axis tick, empty between rows.
    fn label_at(&self, y: f64) -> String {
        slot_at(y, self.bars.len())
            .and_then(|slot| self.bars.iter().find(|b| b.y == slot as f64))
            .map(|b| b.term_name.clone())
            .unwrap_or_default()
    }
}

/// Lay out one bar per row. `rows` must already be in display order.
pub fn plan_bar_panel(
    rows: &[EnrichmentRow],
    title: Option<&str>,
    label_points: u32,
    value_points: u32,
) -> BarPanel {
    let max_score = rows.iter().map(|r| r.score).fold(0.0_f64, f64::max);
    let x_max = if max_score > 0.0 { max_score * X_HEADROOM } else { 1.0 };

    let bars = rows
        .iter()
        .enumerate()
        .map(|(i, row)| BarMark {
            term_name: row.term_name.clone(),
            score: row.score,
            value_label: format!("{:.2}", row.score),
            fill: score_color(row.score, max_score),
            y: row_y(i, rows.len()),
            value_x: row.score.max(0.0) + max_score * VALUE_OFFSET,
        })
        .collect();

    BarPanel {
        bars,
        x_max,
        title: title.map(str::to_string),
        label_points,
        value_points,
    }
}

/// Height below the plot for tick labels and the axis title.
pub fn x_axis_height() -> u32 {
    line_height(TICK_POINTS) + line_height(AXIS_LABEL_POINTS) + 2 * LABEL_GAP
}

/// Height above the plot for the panel title.
pub fn title_height(title: Option<&str>) -> u32 {
    match title {
        Some(_) => line_height(TITLE_POINTS) + 2 * LABEL_GAP,
        None => 0,
    }
}

/// Width to the left of the bars for the pathway names.
pub fn label_area_width<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &BarPanel,
) -> FigureResult<u32> {
    let style = TextStyle::from(font(panel.label_points));
    let widest = widest_text(area, panel.bars.iter().map(|b| b.term_name.as_str()), &style)?;
    Ok(widest + 2 * LABEL_GAP)
}

pub fn draw_bar_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &BarPanel,
    frame: PanelFrame,
    label_width: u32,
) -> FigureResult<PanelRows> {
    let rows = panel.bars.len();

    let mut chart = ChartBuilder::on(area)
        .margin(frame.margin)
        .margin_top(frame.margin + frame.header)
        .x_label_area_size(frame.footer)
        .y_label_area_size(label_width)
        .build_cartesian_2d(0.0..panel.x_max, slot_range(rows))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(X_LABELS)
        .y_labels(rows.max(1))
        .y_label_formatter(&|y: &f64| panel.label_at(*y))
        .x_label_style(font(TICK_POINTS))
        .y_label_style(font(panel.label_points))
        .x_desc(X_AXIS_LABEL)
        .axis_desc_style(bold_font(AXIS_LABEL_POINTS))
        .draw()
        .map_err(render_err)?;

    // Dashed vertical grid at the score ticks, behind the bars.
    let y_span = slot_range(rows);
    for x in chart.as_coord_spec().x_spec().key_points(X_LABELS) {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x, y_span.start), (x, y_span.end)],
                6,
                4,
                GRID_MAJOR.stroke_width(1),
            ))
            .map_err(render_err)?;
    }

    let half = BAR_HEIGHT / 2.0;
    let corners = |b: &BarMark| [(0.0, b.y - half), (b.score.max(0.0), b.y + half)];
    chart
        .draw_series(
            panel
                .bars
                .iter()
                .map(|b| Rectangle::new(corners(b), b.fill.filled())),
        )
        .map_err(render_err)?;
    chart
        .draw_series(
            panel
                .bars
                .iter()
                .map(|b| Rectangle::new(corners(b), BAR_EDGE.stroke_width(2))),
        )
        .map_err(render_err)?;

    let value_style = bold_font(panel.value_points)
        .color(&BAR_EDGE)
        .pos(Pos::new(HPos::Left, VPos::Center));
    chart
        .draw_series(panel.bars.iter().map(|b| {
            Text::new(b.value_label.clone(), (b.value_x, b.y), value_style.clone())
        }))
        .map_err(render_err)?;

    let plot = PixelRect::of_area(chart.plotting_area());
    if let Some(title) = &panel.title {
        let (base_x, base_y) = area.get_base_pixel();
        let center = (
            (plot.x0 + plot.x1) / 2 - base_x,
            plot.y0 - (frame.header / 2) as i32 - base_y,
        );
        area.draw(&Text::new(
            title.clone(),
            center,
            bold_font(TITLE_POINTS)
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(render_err)?;
    }

    let centers = panel
        .bars
        .iter()
        .map(|b| chart.backend_coord(&(0.0, b.y)).1)
        .collect();
    Ok(PanelRows { plot, centers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(term: &str, score: f64) -> EnrichmentRow {
        EnrichmentRow {
            term_name: term.to_string(),
            score,
            genes: vec![],
        }
    }

    fn plan(rows: &[EnrichmentRow]) -> BarPanel {
        plan_bar_panel(rows, Some("KEGG Pathway Enrichment"), 14, 9)
    }

    #[test]
    fn first_row_is_on_top() {
        let rows = vec![row("A", 5.0), row("B", 3.21), row("C", 1.0)];
        let panel = plan(&rows);

        let labels: Vec<&str> = panel.bars.iter().map(|b| b.term_name.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert!(panel.bars.windows(2).all(|w| w[0].y > w[1].y));
        assert_eq!(panel.bars[1].value_label, "3.21");
        assert_eq!(panel.label_at(2.0), "A");
        assert_eq!(panel.label_at(0.0), "C");
        assert_eq!(panel.label_at(0.5), "");
    }

    #[test]
    fn longest_bar_leaves_room_for_its_label() {
        let panel = plan(&[row("A", 5.0)]);
        let bar = &panel.bars[0];
        assert_eq!(panel.x_max, 5.0 * X_HEADROOM);
        assert!((bar.value_x - 5.1).abs() < 1e-12);
        assert!(bar.value_x < panel.x_max);
    }

    #[test]
    fn darker_fill_for_higher_scores() {
        let panel = plan(&[row("A", 8.0), row("B", 2.0)]);
        assert_eq!(panel.bars[0].fill, score_color(8.0, 8.0));
        assert_ne!(panel.bars[0].fill, panel.bars[1].fill);
    }

    #[test]
    fn drawn_rows_run_top_down_inside_the_plot() {
        let rows = vec![row("TNF signaling pathway", 4.5), row("Efferocytosis", 1.2)];
        let panel = plan(&rows);
        let frame = PanelFrame {
            margin: 15,
            header: title_height(panel.title.as_deref()),
            footer: x_axis_height(),
        };

        let mut svg = String::new();
        let drawn = {
            let root = SVGBackend::with_string(&mut svg, (1200, 400)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            let label_width = label_area_width(&root, &panel).unwrap();
            assert!(label_width > 2 * LABEL_GAP);
            let drawn = draw_bar_panel(&root, &panel, frame, label_width).unwrap();
            root.present().unwrap();
            drawn
        };

        assert_eq!(drawn.centers.len(), 2);
        assert!(drawn.centers[0] < drawn.centers[1]);
        assert!(drawn.centers.iter().all(|&y| y > drawn.plot.y0 && y < drawn.plot.y1));
        assert_eq!(drawn.plot.y0, (frame.margin + frame.header) as i32);
        let needles = [
            "TNF signaling pathway",
            "4.50",
            "1.20",
            X_AXIS_LABEL,
            "KEGG Pathway Enrichment",
        ];
        for needle in needles {
            assert!(svg.contains(needle), "missing {needle}");
        }
    }
}
