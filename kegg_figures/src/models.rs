use std::path::PathBuf;

use polars::prelude::PolarsError;
use serde::Serialize;
use thiserror::Error;

pub const TERM_COLUMN: &str = "term_name";
pub const SCORE_COLUMN: &str = "negative_log10_of_adjusted_p_value";
pub const GENES_COLUMN: &str = "intersections";

/// One pathway row of a gProfiler enrichment export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentRow {
    pub term_name: String,
    /// -log10(Padj); higher is more significant.
    pub score: f64,
    pub genes: Vec<String>,
}

impl EnrichmentRow {
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    HubGenes,
    TopPathways,
}

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("file '{}' not found", .0.display())]
    MissingFile(PathBuf),

    #[error("no selected pathways found in CSV, please check the term_name column")]
    EmptySelection,

    #[error("required column '{0}' is missing from the input table")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' has no usable value")]
    MalformedRow { row: usize, column: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not read input table: {0}")]
    Table(#[from] PolarsError),

    #[error("could not read input path: {0}")]
    Prompt(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type FigureResult<T> = Result<T, FigureError>;

/// Wrap a drawing backend error, which is generic over the backend type.
pub fn render_err<E: std::fmt::Display>(e: E) -> FigureError {
    FigureError::Render(e.to_string())
}

/// Rows read from one input, with the name it was read under.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub label: String,
    pub rows: Vec<EnrichmentRow>,
}

/// A tabular source of enrichment rows.
pub trait Dataset {
    fn load(&self) -> FigureResult<LoadedTable>;
}
