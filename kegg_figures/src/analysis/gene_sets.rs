use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;

use crate::models::EnrichmentRow;

/// Pathway-by-gene membership for the heatmap panel.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneIncidence {
    /// Sorted, deduplicated gene symbols; the matrix column index.
    pub genes: Vec<String>,
    /// `rows.len() x genes.len()`; true where the pathway contains the gene.
    pub matrix: Array2<bool>,
}

impl GeneIncidence {
    pub fn from_rows(rows: &[EnrichmentRow]) -> Self {
        let genes = gene_universe(rows);
        let matrix = incidence_matrix(rows, &genes);
        GeneIncidence { genes, matrix }
    }

    pub fn contains(&self, row: usize, gene: usize) -> bool {
        self.matrix.get((row, gene)).copied().unwrap_or(false)
    }

    pub fn filled_cells(&self) -> usize {
        self.matrix.iter().filter(|&&cell| cell).count()
    }
}

pub fn gene_universe(rows: &[EnrichmentRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|r| r.genes.iter().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

pub fn incidence_matrix(rows: &[EnrichmentRow], genes: &[String]) -> Array2<bool> {
    let column: HashMap<&str, usize> = genes
        .iter()
        .enumerate()
        .map(|(j, g)| (g.as_str(), j))
        .collect();

    let mut matrix = Array2::from_elem((rows.len(), genes.len()), false);
    for (i, row) in rows.iter().enumerate() {
        for gene in &row.genes {
            if let Some(&j) = column.get(gene.as_str()) {
                matrix[[i, j]] = true;
            }
        }
    }
    matrix
}
