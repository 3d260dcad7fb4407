use polars::prelude::*;
use tracing::{debug, error, info, warn};

use crate::data_handling::input_source::InputSource;
use crate::helper_functions::{read_csv, split_gene_list};
use crate::models::{
    Dataset, EnrichmentRow, FigureError, FigureResult, LoadedTable, GENES_COLUMN, SCORE_COLUMN,
    TERM_COLUMN,
};

/// gProfiler enrichment export, reduced to the three columns the figures use.
pub struct EnrichmentTable {
    pub source: Box<dyn InputSource>,
}

impl Dataset for EnrichmentTable {
    fn load(&self) -> FigureResult<LoadedTable> {
        let input = self.source.resolve()?;
        info!("Loading data from {}", input.label);

        let df = match read_csv(input.bytes) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read enrichment CSV: {}", e);
                return Err(e.into());
            }
        };
        debug!("Loaded {} rows, {} columns", df.height(), df.width());

        let rows = rows_from_frame(df)?;
        info!("Total pathways: {}", rows.len());
        Ok(LoadedTable {
            label: input.label,
            rows,
        })
    }
}

fn require_columns(df: &DataFrame) -> FigureResult<()> {
    for name in [TERM_COLUMN, SCORE_COLUMN, GENES_COLUMN] {
        if !df.get_column_names().iter().any(|c| c.as_str() == name) {
            return Err(FigureError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

/// Cast the enrichment columns to their working types and convert them to rows.
/// Term names are trimmed; every row must carry a finite score and a gene list.
pub fn rows_from_frame(df: DataFrame) -> FigureResult<Vec<EnrichmentRow>> {
    require_columns(&df)?;

    let df = df
        .lazy()
        .select([
            col(TERM_COLUMN).cast(DataType::String),
            col(SCORE_COLUMN).cast(DataType::Float64),
            col(GENES_COLUMN).cast(DataType::String),
        ])
        .collect()?;

    let terms = df.column(TERM_COLUMN)?.str()?;
    let scores = df.column(SCORE_COLUMN)?.f64()?;
    let genes = df.column(GENES_COLUMN)?.str()?;

    let malformed = |row: usize, column: &str| FigureError::MalformedRow {
        row: row + 1,
        column: column.to_string(),
    };

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let term = terms.get(i).ok_or_else(|| malformed(i, TERM_COLUMN))?;
        let score = scores
            .get(i)
            .filter(|s| s.is_finite())
            .ok_or_else(|| malformed(i, SCORE_COLUMN))?;
        let gene_field = genes.get(i).ok_or_else(|| malformed(i, GENES_COLUMN))?;

        if score < 0.0 {
            warn!("Pathway '{}' has a negative score ({})", term.trim(), score);
        }

        rows.push(EnrichmentRow {
            term_name: term.trim().to_string(),
            score,
            genes: split_gene_list(gene_field),
        });
    }

    Ok(rows)
}
