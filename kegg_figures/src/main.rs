use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{load_pathway_list, FigureConfig, Selection, DEFAULT_DPI, DEFAULT_TOP_N};
use crate::data_handling::enrichment_table::EnrichmentTable;
use crate::data_handling::input_source::source_from_arg;
use crate::pipeline::run_figure;

mod analysis;
mod config;
mod data_handling;
mod helper_functions;
mod models;
mod pipeline;
mod plotting;
mod report;

#[derive(Parser)]
#[command(
    name = "kegg_figures",
    version,
    about = "KEGG pathway enrichment figures from gProfiler CSV exports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (can be repeated); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Curated cardiometabolic pathways with the hub-gene heatmap (Figure 2A)
    Hub(HubArgs),

    /// Most significant pathways overall (Figure 2B)
    Top(TopArgs),
}

#[derive(Args)]
struct HubArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Newline-delimited pathway names replacing the built-in cardiometabolic list
    #[arg(long)]
    pathways: Option<PathBuf>,
}

#[derive(Args)]
struct TopArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of pathways to plot
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
}

#[derive(Args)]
struct CommonArgs {
    /// gProfiler CSV; `-` reads standard input, omit to be prompted
    input: Option<PathBuf>,

    /// Directory for the PNG and PDF files
    #[arg(short, long, env = "KEGG_FIGURES_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Resolution of the PNG
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// Output file name without extension
    #[arg(long)]
    output_stem: Option<String>,

    /// Also write the run summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

impl CommonArgs {
    fn apply(&self, config: &mut FigureConfig) {
        config.output.dir = self.out_dir.clone();
        config.output.dpi = self.dpi;
        if let Some(stem) = &self.output_stem {
            config.output.stem = stem.clone();
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (config, common) = match &cli.command {
        Commands::Hub(args) => {
            info!("KEGG Pathway Enrichment Visualization - Hub Genes");
            let mut config = FigureConfig::hub_genes();
            if let Some(path) = &args.pathways {
                let terms = load_pathway_list(path)
                    .with_context(|| format!("loading pathway list {}", path.display()))?;
                config.selection = Selection::AllowList(terms);
            }
            args.common.apply(&mut config);
            (config, &args.common)
        }
        Commands::Top(args) => {
            info!("KEGG Pathway Enrichment Visualization - Top {}", args.top_n);
            let mut config = FigureConfig::top_pathways(args.top_n);
            args.common.apply(&mut config);
            (config, &args.common)
        }
    };

    let dataset = EnrichmentTable {
        source: source_from_arg(common.input.as_deref()),
    };
    let summary = run_figure(&config, &dataset).context("figure generation failed")?;

    if let Some(path) = &common.summary_json {
        summary
            .write_json(path)
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }

    Ok(())
}
