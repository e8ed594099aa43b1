use clap::{Parser, Subcommand};
use partprice_core::domain::ValidationError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Debug, Parser)]
#[command(name = "partprice", about = "Track supplier prices for spare parts")]
struct Args {
    /// Directory holding the local store. Defaults to PARTPRICE_DATA_DIR or ./.partprice.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage namespace. Defaults to PARTPRICE_NAMESPACE or "part-prices".
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Override the current time (RFC 3339 or YYYY-MM-DD).
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record a price observation, timestamped now.
    Add {
        /// Supplier name, or the index of an existing supplier (see `options supplier`).
        #[arg(long)]
        supplier: String,
        /// Part name, or the index of an existing part (see `options part`).
        #[arg(long)]
        part: String,
        #[arg(long, allow_hyphen_values = true)]
        price: String,
    },
    /// List every stored record.
    List,
    /// Latest and mean price per supplier for one part.
    Summary { part: String },
    /// Supplier comparison for every part.
    Overview,
    /// Distinct values of a field (supplier or part) for pickers.
    Options { field: String },
    /// Daily price series for one part, ready for a line chart.
    Series {
        part: String,
        /// Window length in days. Defaults to PARTPRICE_CHART_RANGE_DAYS or 30.
        #[arg(long)]
        range_days: Option<u32>,
    },
    /// Write a CSV backup of the store.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the store contents with a CSV backup.
    Import { path: PathBuf },
    /// Delete every record.
    Clear,
    /// Generate synthetic weekly sample data.
    Sample {
        /// Output file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// First sample date (RFC 3339 or YYYY-MM-DD). Defaults to 2012-01-01.
        #[arg(long)]
        start: Option<String>,
        /// Also replace the store contents with the generated records.
        #[arg(long)]
        import: bool,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let settings = match partprice_core::config::Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match commands::run(args, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(invalid) = err.downcast_ref::<ValidationError>() {
                tracing::warn!(error = %invalid, "rejected input");
                eprintln!("invalid input: {invalid}");
                return ExitCode::from(2);
            }

            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_sentry(settings: &partprice_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
