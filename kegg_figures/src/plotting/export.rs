use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use resvg::{tiny_skia, usvg};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::OutputConfig;
use crate::helper_functions::ensure_output_dir;
use crate::models::{FigureError, FigureResult};
use crate::plotting::PX_PER_INCH;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrittenFigure {
    pub png: PathBuf,
    pub pdf: PathBuf,
}

const METRES_PER_INCH: f64 = 0.0254;

fn export_err<E: std::fmt::Display>(e: E) -> FigureError {
    FigureError::Export(e.to_string())
}

// Sans families tried, in order, for the generic `sans-serif` plotters writes.
const SANS_FAMILIES: [&str; 6] = [
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "FreeSans",
];

/// Pick the installed family to stand in for `sans-serif`: a preferred face
/// when present, else any "Sans" family, else the first family by name.
fn sans_family<'a>(installed: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let installed: BTreeSet<&str> = installed.into_iter().collect();
    SANS_FAMILIES
        .iter()
        .copied()
        .find(|family| installed.contains(family))
        .or_else(|| installed.iter().copied().find(|f| f.contains("Sans")))
        .or_else(|| installed.iter().next().copied())
        .map(str::to_string)
}

fn png_options() -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    let fontdb = options.fontdb_mut();
    fontdb.load_system_fonts();
    let family = sans_family(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );
    match family {
        Some(family) => {
            debug!("Rendering sans-serif text with {}", family);
            fontdb.set_sans_serif_family(family);
        }
        None => warn!("No system fonts found; figure text will be missing"),
    }
    options
}

fn pdf_options() -> svg2pdf::usvg::Options<'static> {
    let mut options = svg2pdf::usvg::Options::default();
    let fontdb = options.fontdb_mut();
    fontdb.load_system_fonts();
    let family = sans_family(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );
    if let Some(family) = family {
        fontdb.set_sans_serif_family(family);
    }
    options
}

fn rasterize(svg: &str, dpi: u32) -> FigureResult<tiny_skia::Pixmap> {
    let tree = usvg::Tree::from_str(svg, &png_options()).map_err(export_err)?;

    let scale = (dpi as f64 / PX_PER_INCH) as f32;
    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FigureError::Export(format!("cannot allocate a {width}x{height} image")))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    debug!("Rasterized figure to {}x{} px at {} dpi", width, height, dpi);
    Ok(pixmap)
}

/// Encode an opaque pixmap as RGBA PNG, recording `dpi` in the pHYs chunk.
fn encode_png(pixmap: &tiny_skia::Pixmap, dpi: u32) -> FigureResult<Vec<u8>> {
    let per_metre = (dpi as f64 / METRES_PER_INCH).round() as u32;
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: per_metre,
            yppu: per_metre,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header().map_err(export_err)?;
        // White background, so premultiplied and straight alpha agree.
        writer.write_image_data(pixmap.data()).map_err(export_err)?;
        writer.finish().map_err(export_err)?;
    }
    Ok(bytes)
}

/// Rasterize an SVG document at `dpi`, returning PNG bytes.
pub fn svg_to_png(svg: &str, dpi: u32) -> FigureResult<Vec<u8>> {
    let pixmap = rasterize(svg, dpi)?;
    encode_png(&pixmap, dpi)
}

/// Convert an SVG document to a single-page vector PDF.
pub fn svg_to_pdf(svg: &str) -> FigureResult<Vec<u8>> {
    let tree = svg2pdf::usvg::Tree::from_str(svg, &pdf_options()).map_err(export_err)?;

    let page = svg2pdf::PageOptions {
        dpi: PX_PER_INCH as f32,
        ..Default::default()
    };
    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), page).map_err(export_err)
}

/// Write the PNG and PDF renditions. Both are encoded before either file is
/// touched, so a failed export leaves existing outputs as they were.
pub fn write_figure(svg: &str, output: &OutputConfig) -> FigureResult<WrittenFigure> {
    let png = svg_to_png(svg, output.dpi)?;
    let pdf = svg_to_pdf(svg)?;

    ensure_output_dir(&output.dir)?;
    let written = WrittenFigure {
        png: output.png_path(),
        pdf: output.pdf_path(),
    };
    fs::write(&written.png, png)?;
    fs::write(&written.pdf, pdf)?;

    info!(
        "Figure saved: {} and {}",
        written.png.display(),
        written.pdf.display()
    );
    Ok(written)
}
