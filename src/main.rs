use anyhow::{Context, Result};
use callview::batch::{IndexOnlyLoader, build_registry, open_source};
use callview::config::Config;
use callview::model::ClusterK;
use callview::table::{TableReader, interpret_with_layout};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect genotyping call summaries and per-SNP cluster images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count call categories in a cohort calls table (long or wide layout)
    Summary(SummaryArgs),

    /// Index cluster PNGs in a folder or .zip archive by marker and K
    Clusters(ClustersArgs),

    /// Open the interactive viewer
    #[cfg(feature = "egui")]
    View(ViewArgs),
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// CSV/TSV file (optionally .gz)
    #[arg(value_name = "CSV")]
    csv: Utf8PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ClustersArgs {
    /// Folder or .zip archive with <snp>_k<1|2|3>.png files
    #[arg(value_name = "SOURCE")]
    source: Utf8PathBuf,

    /// Only list markers that have an image for this K (1, 2 or 3)
    #[arg(short, long)]
    k: Option<ClusterK>,
}

#[cfg(feature = "egui")]
#[derive(Parser, Debug)]
struct ViewArgs {
    /// Cohort calls table to load at startup
    #[arg(long)]
    summary: Option<Utf8PathBuf>,

    /// Folder or .zip archive of cluster images to load at startup
    #[arg(long)]
    clusters: Option<Utf8PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = Config::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Summary(args) => run_summary(args, &config),
        Commands::Clusters(args) => run_clusters(args),
        #[cfg(feature = "egui")]
        Commands::View(args) => callview::egui_app::run(config, args.summary, args.clusters),
    }
}

fn run_summary(args: SummaryArgs, config: &Config) -> Result<()> {
    let reader = TableReader::new().progress_every(config.progress_every_rows);
    let rows = reader.load(&args.csv, &mut |n| debug!("Reading CSV… rows processed: {}", n))?;
    let (counts, layout) = interpret_with_layout(&rows);
    match args.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "rows": rows.len(),
                "layout": layout,
                "counts": counts,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            let view = callview::summary::SummaryView::from_counts(&counts);
            for (label, value) in view.table_rows() {
                println!("{}\t{}", label, value);
            }
        }
    }
    Ok(())
}

fn run_clusters(args: ClustersArgs) -> Result<()> {
    let mut source = open_source(&args.source)?;
    let registry = build_registry(source.as_mut(), &mut IndexOnlyLoader, &mut |p| {
        debug!("{}", p.message())
    })
    .with_context(|| format!("Failed to load cluster images from {}", args.source))?;

    if let Some(k) = args.k {
        let markers = registry.list_markers(k);
        info!("{} markers with {} images", markers.len(), k.label());
        for m in markers {
            println!("{}", m);
        }
        return Ok(());
    }

    let mut out = serde_json::Map::new();
    for (marker, entry) in registry.iter() {
        let mut slots = serde_json::Map::new();
        for k in ClusterK::ALL {
            slots.insert(k.to_string(), serde_json::json!(entry.file_name(k)));
        }
        out.insert(marker.to_string(), serde_json::Value::Object(slots));
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
