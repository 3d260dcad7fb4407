use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::{FigureError, FigureKind, FigureResult};

/// Cardiometabolic KEGG pathways of interest for the hub-gene figure,
/// grouped as inflammation, metabolic dysfunction and vascular pathology.
pub const CARDIOMETABOLIC_TERMS: [&str; 18] = [
    "TNF signaling pathway",
    "IL-17 signaling pathway",
    "Th17 cell differentiation",
    "Toll-like receptor signaling pathway",
    "NOD-like receptor signaling pathway",
    "Cytosolic DNA-sensing pathway",
    "HIF-1 signaling pathway",
    "AGE-RAGE signaling pathway in diabetic complications",
    "PPAR signaling pathway",
    "Insulin resistance",
    "FoxO signaling pathway",
    "Apelin signaling pathway",
    "Lipid and atherosclerosis",
    "Fluid shear stress and atherosclerosis",
    "Relaxin signaling pathway",
    "VEGF signaling pathway",
    "Adrenergic signaling in cardiomyocytes",
    "Efferocytosis",
];

pub const HUB_OUTPUT_STEM: &str = "Figure2A_Hub_Cardiometabolic_KEGG";
pub const TOP_OUTPUT_STEM: &str = "Figure2B_Top10_KEGG_Pathways";
pub const DEFAULT_DPI: u32 = 300;
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Keep rows whose term matches an entry; entries keep their curated order.
    AllowList(Vec<String>),
    TopN(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub width_in: f64,
    pub min_height_in: f64,
    pub row_height_in: f64,
    /// Fraction of the width given to the bar panel when a heatmap is drawn.
    pub bar_panel_fraction: f64,
    pub title: Option<String>,
    pub label_font_size: u32,
    pub value_font_size: u32,
    pub gene_font_size: u32,
}

impl LayoutConfig {
    /// Figure height in inches for `rows` bars.
    pub fn height_in(&self, rows: usize) -> f64 {
        (rows as f64 * self.row_height_in).max(self.min_height_in)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub stem: String,
    pub dpi: u32,
}

impl OutputConfig {
    pub fn png_path(&self) -> PathBuf {
        self.dir.join(format!("{}.png", self.stem))
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.dir.join(format!("{}.pdf", self.stem))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureConfig {
    pub kind: FigureKind,
    pub selection: Selection,
    pub layout: LayoutConfig,
    pub output: OutputConfig,
}

impl FigureConfig {
    /// Figure 2A: curated cardiometabolic pathways with the gene heatmap.
    pub fn hub_genes() -> Self {
        FigureConfig {
            kind: FigureKind::HubGenes,
            selection: Selection::AllowList(
                CARDIOMETABOLIC_TERMS.iter().map(|t| t.to_string()).collect(),
            ),
            layout: LayoutConfig {
                width_in: 18.0,
                min_height_in: 8.0,
                row_height_in: 0.6,
                bar_panel_fraction: 2.5 / 4.0,
                title: Some("KEGG Pathway Enrichment".to_string()),
                label_font_size: 14,
                value_font_size: 9,
                gene_font_size: 14,
            },
            output: OutputConfig {
                dir: PathBuf::from("."),
                stem: HUB_OUTPUT_STEM.to_string(),
                dpi: DEFAULT_DPI,
            },
        }
    }

    /// Figure 2B: the `top_n` most significant pathways.
    pub fn top_pathways(top_n: usize) -> Self {
        FigureConfig {
            kind: FigureKind::TopPathways,
            selection: Selection::TopN(top_n),
            layout: LayoutConfig {
                width_in: 12.0,
                min_height_in: 6.0,
                row_height_in: 0.5,
                bar_panel_fraction: 1.0,
                title: None,
                label_font_size: 15,
                value_font_size: 10,
                gene_font_size: 14,
            },
            output: OutputConfig {
                dir: PathBuf::from("."),
                stem: TOP_OUTPUT_STEM.to_string(),
                dpi: DEFAULT_DPI,
            },
        }
    }

    pub fn validate(&self) -> FigureResult<()> {
        match &self.selection {
            Selection::AllowList(terms) if terms.is_empty() => {
                return Err(FigureError::InvalidConfig(
                    "the pathway allow-list is empty".into(),
                ))
            }
            Selection::TopN(0) => {
                return Err(FigureError::InvalidConfig(
                    "top-n must be at least 1".into(),
                ))
            }
            _ => {}
        }
        if self.output.dpi == 0 {
            return Err(FigureError::InvalidConfig("dpi must be positive".into()));
        }
        if self.output.stem.trim().is_empty() {
            return Err(FigureError::InvalidConfig("output stem is empty".into()));
        }
        Ok(())
    }
}

/// Read a newline-delimited pathway list. Blank lines and `#` comments are skipped.
pub fn load_pathway_list(path: &Path) -> FigureResult<Vec<String>> {
    if !path.exists() {
        return Err(FigureError::MissingFile(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let terms = parse_pathway_list(&text);
    debug!("Read {} pathway names from {}", terms.len(), path.display());
    if terms.is_empty() {
        return Err(FigureError::InvalidConfig(format!(
            "pathway list {} contains no entries",
            path.display()
        )));
    }
    Ok(terms)
}

fn parse_pathway_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn height_has_a_floor_and_grows_per_row() {
        let layout = FigureConfig::hub_genes().layout;
        assert_eq!(layout.height_in(3), 8.0);
        assert!((layout.height_in(20) - 12.0).abs() < 1e-9);

        let layout = FigureConfig::top_pathways(10).layout;
        assert_eq!(layout.height_in(10), 6.0);
        assert!((layout.height_in(14) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn output_paths_use_stem_and_dir() {
        let mut cfg = FigureConfig::top_pathways(10);
        cfg.output.dir = PathBuf::from("/tmp/out");
        assert_eq!(
            cfg.output.png_path(),
            PathBuf::from("/tmp/out/Figure2B_Top10_KEGG_Pathways.png")
        );
        assert_eq!(
            cfg.output.pdf_path(),
            PathBuf::from("/tmp/out/Figure2B_Top10_KEGG_Pathways.pdf")
        );
    }

    #[test]
    fn rejects_degenerate_configs() {
        assert!(FigureConfig::top_pathways(0).validate().is_err());

        let mut cfg = FigureConfig::hub_genes();
        cfg.selection = Selection::AllowList(vec![]);
        assert!(matches!(cfg.validate(), Err(FigureError::InvalidConfig(_))));

        let mut cfg = FigureConfig::hub_genes();
        cfg.output.dpi = 0;
        assert!(cfg.validate().is_err());

        assert!(FigureConfig::hub_genes().validate().is_ok());
    }

    #[test]
    fn pathway_list_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# vascular").unwrap();
        writeln!(file, "  VEGF signaling pathway  ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Efferocytosis").unwrap();

        let terms = load_pathway_list(file.path()).unwrap();
        assert_eq!(terms, vec!["VEGF signaling pathway", "Efferocytosis"]);
    }

    #[test]
    fn missing_pathway_list_is_reported() {
        let err = load_pathway_list(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, FigureError::MissingFile(_)));
    }
}
