use std::path::PathBuf;

use clap::{Parser, Subcommand};

use epiplot::data::catalog::Catalog;
use epiplot::data::datetime::MonthDate;
use epiplot::data::loader::FileSource;
use epiplot::error::DashResult;
use epiplot::processing::series::DateRange;
use epiplot::state::session::{DashboardSession, QueryRequest};

#[derive(Debug, Parser)]
#[command(
    name = "epiplot",
    version,
    about = "Municipal epidemiological and socio-environmental time-series dashboard"
)]
struct Cli {
    /// Directory containing the spreadsheet data files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON catalog overriding the built-in dataset sources.
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every configured variable key with its display name.
    Variables,
    /// Load a variable's dataset(s) and list the municipalities found.
    Municipalities {
        variable: String,
        /// Filter by a name or code substring.
        #[arg(long)]
        search: Option<String>,
    },
    /// Assemble the time series for one municipality and print it with
    /// summary statistics.
    Query {
        variable: String,
        /// Municipality code as it appears in the source sheets.
        #[arg(long)]
        municipality: String,
        /// Inclusive start month (YYYY-MM).
        #[arg(long)]
        start: Option<MonthDate>,
        /// Inclusive end month (YYYY-MM).
        #[arg(long)]
        end: Option<MonthDate>,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> DashResult<()> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_json_file(path)?,
        None => Catalog::builtin(),
    };
    let mut session = DashboardSession::new(catalog, FileSource::new(cli.data_dir));

    match cli.command {
        Command::Variables => {
            for (key, display) in session.catalog().variables() {
                println!("{key:<16} {display}");
            }
        }
        Command::Municipalities { variable, search } => {
            let keys = session.catalog().resolve(&variable)?;
            for key in &keys {
                let summary = session.load(key)?;
                println!(
                    "Loaded {}: {} municipalities found.",
                    summary.display_name, summary.municipality_count
                );
            }
            let term = search.as_deref().unwrap_or("");
            if let Some(hits) = session.search_municipalities(&keys[0], term) {
                for municipality in hits {
                    println!("{}", municipality.label());
                }
            }
        }
        Command::Query {
            variable,
            municipality,
            start,
            end,
        } => {
            let range = if start.is_some() || end.is_some() {
                Some(DateRange::new(start, end))
            } else {
                None
            };
            let result = session.query(&QueryRequest {
                variable,
                municipality_code: municipality,
                range,
            })?;

            println!("Municipality: {}\n", result.municipality_name);
            for report in &result.series {
                println!("{}", report.label);
                for point in &report.points {
                    println!("  {}  {:.4}", point.date, point.value);
                }
                match &report.stats {
                    Some(stats) => println!("\n{}", stats.report(&report.label)),
                    None => println!("\n{}: no data\n", report.label),
                }
            }
        }
    }

    Ok(())
}
