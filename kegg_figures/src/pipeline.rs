use tracing::{debug, info, warn};

use crate::analysis::gene_sets::GeneIncidence;
use crate::analysis::selection::select;
use crate::config::FigureConfig;
use crate::models::{Dataset, FigureKind, FigureResult};
use crate::plotting::export::write_figure;
use crate::plotting::figures::render_figure;
use crate::report::FigureSummary;

/// Load, select, render and write one figure. Nothing is written unless every
/// earlier stage succeeds.
pub fn run_figure(config: &FigureConfig, dataset: &dyn Dataset) -> FigureResult<FigureSummary> {
    config.validate()?;

    let table = dataset.load()?;
    let rows = table.rows;
    let selected = select(&config.selection, &rows)?;
    if selected.rows.is_empty() {
        warn!("Input table has no pathways; the figure will be empty");
    }
    info!("Pathways selected: {}", selected.rows.len());
    for r in &selected.rows {
        debug!("  {} | {:.2} | {} genes", r.term_name, r.score, r.gene_count());
    }

    let incidence = match config.kind {
        FigureKind::HubGenes => {
            let incidence = GeneIncidence::from_rows(&selected.rows);
            info!("Unique genes: {}", incidence.genes.len());
            info!("Genes: {}", incidence.genes.join(", "));
            Some(incidence)
        }
        FigureKind::TopPathways => None,
    };

    info!("Creating visualization...");
    let figure = render_figure(&config.layout, &selected.rows, incidence.as_ref())?;
    debug!(
        "Canvas {}x{} px, PNG at {} dpi",
        figure.width_px, figure.height_px, config.output.dpi
    );
    let written = write_figure(&figure.svg, &config.output)?;

    let summary = FigureSummary::new(
        config.kind,
        &table.label,
        &rows,
        &selected,
        incidence.as_ref(),
        written,
    );
    summary.log();

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selection;
    use crate::data_handling::enrichment_table::EnrichmentTable;
    use crate::data_handling::input_source::MemorySource;
    use crate::models::FigureError;
    use std::path::Path;

    const HEADER: &str = concat!(
        "source,native,term_name,p_value,",
        "negative_log10_of_adjusted_p_value,intersections\n"
    );

    fn table(body: &str) -> EnrichmentTable {
        EnrichmentTable {
            source: Box::new(MemorySource {
                label: "gprofiler.csv".to_string(),
                bytes: format!("{HEADER}{body}").into_bytes(),
            }),
        }
    }

    fn in_dir(mut config: FigureConfig, dir: &Path) -> FigureConfig {
        config.output.dir = dir.to_path_buf();
        config.output.dpi = 100;
        config
    }

    #[test]
    fn hub_figure_keeps_curated_pathways_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = in_dir(FigureConfig::hub_genes(), dir.path());
        let data = table(
            "KEGG,KEGG:04370,VEGF signaling pathway,0.0006,3.21,\"VEGFA, KDR, FLT1\"\n\
             KEGG,KEGG:03010,Ribosome,0.00001,5.0,\"RPL3\"\n\
             KEGG,KEGG:04668, TNF signaling pathway ,0.0001,4.0,\"TNF, IL6, VEGFA\"\n",
        );

        let summary = run_figure(&config, &data).unwrap();
        let names: Vec<&str> = summary.pathways.iter().map(|p| p.term_name.as_str()).collect();
        assert_eq!(names, vec!["TNF signaling pathway", "VEGF signaling pathway"]);

        let vegf = &summary.pathways[1];
        assert_eq!(vegf.gene_count, 3);
        assert_eq!(vegf.score, 3.21);

        assert_eq!(
            summary.unique_genes.as_deref().unwrap(),
            ["FLT1", "IL6", "KDR", "TNF", "VEGFA"]
        );
        assert_eq!(summary.total_pathways, 3);
        assert!(dir.path().join("Figure2A_Hub_Cardiometabolic_KEGG.png").is_file());
        assert!(dir.path().join("Figure2A_Hub_Cardiometabolic_KEGG.pdf").is_file());
    }

    #[test]
    fn empty_selection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = in_dir(FigureConfig::hub_genes(), dir.path());
        let data = table("KEGG,KEGG:03010,Ribosome,0.00001,5.0,\"RPL3\"\n");

        let err = run_figure(&config, &data).err().unwrap();
        assert!(matches!(err, FigureError::EmptySelection));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn top_n_on_seven_rows_draws_seven_bars() {
        let dir = tempfile::tempdir().unwrap();
        let config = in_dir(FigureConfig::top_pathways(10), dir.path());
        let body: String = (0..7)
            .map(|i| format!("KEGG,KEGG:{i},Pathway {i},0.01,{}.5,\"G{i}, H{i}\"\n", i + 1))
            .collect();

        let summary = run_figure(&config, &table(&body)).unwrap();
        assert_eq!(summary.pathways.len(), 7);
        assert!(summary.unique_genes.is_none());
        assert_eq!(summary.pathways[0].term_name, "Pathway 6");
        assert!(summary.pathways.windows(2).all(|w| w[0].score > w[1].score));
        assert!(dir.path().join("Figure2B_Top10_KEGG_Pathways.png").is_file());
    }

    #[test]
    fn custom_allow_list_and_stem() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = in_dir(FigureConfig::hub_genes(), dir.path());
        config.selection = Selection::AllowList(vec!["Ribosome".to_string()]);
        config.output.stem = "ribosome_only".to_string();

        let data = table("KEGG,KEGG:03010,Ribosome,0.00001,5.0,\"RPL3, RPL4\"\n");
        let summary = run_figure(&config, &data).unwrap();
        assert_eq!(summary.pathways.len(), 1);
        assert!(dir.path().join("ribosome_only.pdf").is_file());
    }

    #[test]
    fn reruns_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = in_dir(FigureConfig::hub_genes(), dir.path());
        let body = "KEGG,a,Efferocytosis,0.1,1.2,\"MERTK, AXL\"\n\
                    KEGG,b,Insulin resistance,0.01,2.4,\"PTPN1, AXL\"\n";

        let first = run_figure(&config, &table(body)).unwrap();
        let first_png = std::fs::read(&first.outputs.png).unwrap();
        let second = run_figure(&config, &table(body)).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second.outputs.png).unwrap(), first_png);
    }

    #[test]
    fn invalid_config_fails_before_loading() {
        let config = FigureConfig::top_pathways(0);
        let data = table("");
        assert!(matches!(
            run_figure(&config, &data),
            Err(FigureError::InvalidConfig(_))
        ));
    }
}
