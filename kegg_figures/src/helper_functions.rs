use std::fs;
use std::io::Cursor;
use std::path::Path;

use polars::error::PolarsResult;
use polars::frame::DataFrame;
use polars::prelude::{CsvReadOptions, SerReader};
use tracing::debug;

use crate::models::FigureResult;

/// Parse CSV bytes with a header row into a DataFrame. Column types are
/// inferred from every row, so a decimal deep in an integer-looking column
/// widens it to Float64.
pub fn read_csv(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Split a gProfiler `intersections` field into trimmed gene symbols.
/// Order and in-row duplicates are preserved; empty tokens are dropped.
pub fn split_gene_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|gene| !gene.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn ensure_output_dir(dir: &Path) -> FigureResult<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        debug!("Creating output directory {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
