use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::Selection;
use crate::models::{EnrichmentRow, FigureError, FigureResult};

/// Rows chosen for a figure, ordered by descending score.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPathways {
    pub rows: Vec<EnrichmentRow>,
    /// Allow-list entries found in the input, in curated order.
    pub matched_terms: Vec<String>,
    /// Allow-list entries absent from the input.
    pub missing_terms: Vec<String>,
}

pub fn select(selection: &Selection, rows: &[EnrichmentRow]) -> FigureResult<SelectedPathways> {
    match selection {
        Selection::AllowList(terms) => select_allow_listed(rows, terms),
        Selection::TopN(n) => Ok(SelectedPathways {
            rows: select_top_n(rows, *n),
            matched_terms: Vec::new(),
            missing_terms: Vec::new(),
        }),
    }
}

/// Stable sort, highest score first. Ties keep their input order.
pub fn sort_by_score_desc(rows: &mut [EnrichmentRow]) {
    rows.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Keep rows whose term is on the allow-list. Errors if nothing survives.
pub fn select_allow_listed(
    rows: &[EnrichmentRow],
    allow_list: &[String],
) -> FigureResult<SelectedPathways> {
    let present: HashSet<&str> = rows.iter().map(|r| r.term_name.as_str()).collect();

    let (matched_terms, missing_terms): (Vec<String>, Vec<String>) = allow_list
        .iter()
        .cloned()
        .partition(|term| present.contains(term.as_str()));

    info!("Selected {} of {} curated pathways", matched_terms.len(), allow_list.len());
    for term in &matched_terms {
        info!("  - {}", term);
    }
    if !missing_terms.is_empty() {
        warn!(
            "{} curated pathways not present in input: {}",
            missing_terms.len(),
            missing_terms.join("; ")
        );
    }

    let keep: HashSet<&str> = matched_terms.iter().map(String::as_str).collect();
    let mut selected: Vec<EnrichmentRow> = rows
        .iter()
        .filter(|r| keep.contains(r.term_name.as_str()))
        .cloned()
        .collect();

    if selected.is_empty() {
        return Err(FigureError::EmptySelection);
    }

    sort_by_score_desc(&mut selected);
    Ok(SelectedPathways {
        rows: selected,
        matched_terms,
        missing_terms,
    })
}

/// The `n` highest-scoring rows; fewer when the table is shorter.
pub fn select_top_n(rows: &[EnrichmentRow], n: usize) -> Vec<EnrichmentRow> {
    let mut ranked = rows.to_vec();
    sort_by_score_desc(&mut ranked);
    ranked.truncate(n);
    ranked
}
