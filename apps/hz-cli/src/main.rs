use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use hz_app::{
    AppError, AppResult, PrepConfig, audit_efficiency, closure, load_config, open_store,
    prepare_database, schema_gaps, write_bundle,
};
use hz_core::{TimeWindow, Year};
use hz_projection::required_schema;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hz")]
#[command(about = "Horizon - myopic window data preparation for energy system models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct WindowArgs {
    /// First period optimized in this window
    #[arg(long)]
    base_year: Option<Year>,
    /// Last period of the window
    #[arg(long)]
    last_year: Option<Year>,
    /// Last period whose demands apply
    #[arg(long)]
    last_demand_year: Option<Year>,
}

impl WindowArgs {
    /// All three bounds or none.
    fn window(&self) -> AppResult<Option<TimeWindow>> {
        match (self.base_year, self.last_year, self.last_demand_year) {
            (None, None, None) => Ok(None),
            (Some(base), Some(last), Some(demand)) => Ok(Some(TimeWindow::new(base, last, demand)?)),
            _ => Err(AppError::InvalidInput(
                "--base-year, --last-year and --last-demand-year go together".to_string(),
            )),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the data bundle for one window (or the full horizon)
    Prep {
        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Input database (overrides the config)
        #[arg(long)]
        db: Option<PathBuf>,
        #[command(flatten)]
        window: WindowArgs,
        /// Output JSON file (overrides the config)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the build report as JSON
        #[arg(long)]
        report: bool,
    },
    /// Show the viability closure for a window
    Closure {
        /// Input database
        db: PathBuf,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Whole-table cleanup advisories over the Efficiency table
    Audit {
        /// Input database
        db: PathBuf,
    },
    /// List the tables and columns read, and report gaps in a database
    Schema {
        /// Input database to check
        db: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Prep {
            config: Some(path), ..
        } => Some(load_config(path)?),
        _ => None,
    };
    init_tracing(config.as_ref().and_then(|c| c.log_filter.as_deref()));

    match cli.command {
        Commands::Prep {
            db,
            window,
            out,
            report,
            ..
        } => cmd_prep(config, db, window, out, report),
        Commands::Closure { db, window } => cmd_closure(&db, window),
        Commands::Audit { db } => cmd_audit(&db),
        Commands::Schema { db } => cmd_schema(db.as_deref()),
    }
}

/// Config filter first, then `RUST_LOG`, then `info`.
fn init_tracing(config_filter: Option<&str>) {
    let filter = config_filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_prep(
    config: Option<PrepConfig>,
    db: Option<PathBuf>,
    window: WindowArgs,
    out: Option<PathBuf>,
    report: bool,
) -> AppResult<()> {
    let database = db
        .or_else(|| config.as_ref().map(|c| c.database.clone()))
        .ok_or_else(|| AppError::InvalidInput("no database given (--db or --config)".to_string()))?;
    let window = match window.window()? {
        Some(w) => Some(w),
        None => config.as_ref().and_then(|c| c.window),
    };
    let out = out.or_else(|| config.as_ref().and_then(|c| c.output.clone()));

    match &window {
        Some(w) => info!(
            base_year = w.base_year(),
            last_year = w.last_year(),
            last_demand_year = w.last_demand_year(),
            "preparing window"
        ),
        None => info!("preparing full horizon"),
    }

    let prepared = prepare_database(&database, window)?;
    println!("✓ Prepared {} entries", prepared.bundle.len());
    println!("  Fingerprint: {}", prepared.fingerprint);
    if !prepared.report.suppressed.is_empty() {
        println!("  Suppressed edges: {}", prepared.report.suppressed.len());
    }
    if !prepared.report.sparse.is_empty() {
        println!("  No data: {}", prepared.report.sparse.join(", "));
    }

    match out {
        Some(path) => {
            write_bundle(&path, &prepared)?;
            println!("  Bundle written to {}", path.display());
        }
        None if !report => println!("{}", serde_json::to_string_pretty(&prepared.bundle)?),
        None => {}
    }
    if report {
        println!("{}", serde_json::to_string_pretty(&prepared.report)?);
    }
    Ok(())
}

fn cmd_closure(db: &Path, window: WindowArgs) -> AppResult<()> {
    let window = window.window()?.ok_or_else(|| {
        AppError::InvalidInput("closure needs --base-year, --last-year and --last-demand-year".to_string())
    })?;
    let store = open_store(db)?;
    let viable = closure(&store, &window)?;

    println!(
        "Viable: {} of {} edges, {} technologies, {} processes, {} rounds",
        viable.edges().len(),
        viable.initial_edge_count(),
        viable.technologies().len(),
        viable.processes().len(),
        viable.rounds().len()
    );
    for (i, round) in viable.rounds().iter().enumerate() {
        let outputs: Vec<&str> = round.illegal_outputs.iter().map(|c| c.as_str()).collect();
        println!(
            "  Round {}: no consumer for {} ({} edges suppressed, {} remain)",
            i + 1,
            outputs.join(", "),
            round.suppressed.len(),
            round.retained_after
        );
        for edge in &round.suppressed {
            println!("    {}", edge);
        }
    }
    Ok(())
}

fn cmd_audit(db: &Path) -> AppResult<()> {
    let store = open_store(db)?;
    let report = audit_efficiency(&store)?;

    println!(
        "Efficiency: {} kept, {} suppressed, {} with unsupplied inputs",
        report.kept.len(),
        report.suppressed.len(),
        report.unsupplied_inputs.len()
    );
    for edge in &report.suppressed {
        println!("  suppressed  {} (no consumer for {})", edge, edge.output);
    }
    for edge in &report.unsupplied_inputs {
        println!("  advisory    {} (nothing supplies {})", edge, edge.input);
    }
    Ok(())
}

fn cmd_schema(db: Option<&Path>) -> AppResult<()> {
    let Some(db) = db else {
        for req in required_schema() {
            let marker = if req.optional { " (optional)" } else { "" };
            println!("{}{}: {}", req.table, marker, req.columns.join(", "));
        }
        return Ok(());
    };

    let store = open_store(db)?;
    let gaps = schema_gaps(&store)?;
    if gaps.is_empty() {
        println!("✓ All required tables and columns present");
        return Ok(());
    }
    for gap in &gaps {
        if gap.missing_table {
            println!("  missing table   {}", gap.table);
        } else {
            println!(
                "  missing columns {}: {}",
                gap.table,
                gap.missing_columns.join(", ")
            );
        }
    }
    Err(AppError::InvalidInput(format!(
        "{} schema gaps in {}",
        gaps.len(),
        db.display()
    )))
}
