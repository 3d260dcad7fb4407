use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::analysis::gene_sets::GeneIncidence;
use crate::analysis::selection::SelectedPathways;
use crate::models::{EnrichmentRow, FigureKind, FigureResult};
use crate::plotting::export::WrittenFigure;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwaySummary {
    pub rank: usize,
    pub term_name: String,
    pub score: f64,
    pub gene_count: usize,
    pub genes: Vec<String>,
}

/// What a figure run selected and wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureSummary {
    pub kind: FigureKind,
    pub input: String,
    pub total_pathways: usize,
    pub pathways: Vec<PathwaySummary>,
    /// Heatmap columns; hub-gene figure only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_genes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_terms: Vec<String>,
    pub mean_score: f64,
    pub mean_gene_count: f64,
    pub outputs: WrittenFigure,
}

impl FigureSummary {
    pub fn new(
        kind: FigureKind,
        input: &str,
        all_rows: &[EnrichmentRow],
        selected: &SelectedPathways,
        incidence: Option<&GeneIncidence>,
        outputs: WrittenFigure,
    ) -> Self {
        let pathways: Vec<PathwaySummary> = selected
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| PathwaySummary {
                rank: i + 1,
                term_name: r.term_name.clone(),
                score: r.score,
                gene_count: r.gene_count(),
                genes: r.genes.clone(),
            })
            .collect();

        FigureSummary {
            kind,
            input: input.to_string(),
            total_pathways: all_rows.len(),
            mean_score: mean(pathways.iter().map(|p| p.score)),
            mean_gene_count: mean(pathways.iter().map(|p| p.gene_count as f64)),
            pathways,
            unique_genes: incidence.map(|inc| inc.genes.clone()),
            missing_terms: selected.missing_terms.clone(),
            outputs,
        }
    }

    pub fn log(&self) {
        info!("{}", "=".repeat(60));
        info!("Analysis Summary");
        info!("{}", "=".repeat(60));
        info!("Total pathways in dataset: {}", self.total_pathways);
        info!("Pathways plotted: {}", self.pathways.len());
        if let Some(genes) = &self.unique_genes {
            info!("Unique genes involved: {}", genes.len());
        }
        info!("Average -log10(Padj): {:.2}", self.mean_score);
        info!("Average gene count: {:.1}", self.mean_gene_count);
        for p in &self.pathways {
            info!(
                "  {}. {} (-log10(Padj) {:.2}): {} genes ({})",
                p.rank,
                p.term_name,
                p.score,
                p.gene_count,
                p.genes.join(", ")
            );
        }
        info!("{}", "=".repeat(60));
    }

    pub fn write_json(&self, path: &Path) -> FigureResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::from)?;
        info!("Summary written to {}", path.display());
        Ok(())
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
