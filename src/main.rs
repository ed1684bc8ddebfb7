use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use trainlog::cli::import::ImportOptions;
use trainlog::cli::{delete, import, list, races, runs, show, stats, weekly, zones};
use trainlog::config::Config;
use trainlog::query::QueryLayer;
use trainlog::store::{ActivityFilter, ActivityStore};

#[derive(Parser)]
#[command(name = "trainlog")]
#[command(about = "Import and analyse training activities from an export archive")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "trainlog.yaml")]
    config: String,
}

/// Calendar-day bounds shared by the listing commands
#[derive(Args)]
struct DateRange {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    until: Option<NaiveDate>,
}

impl DateRange {
    fn filter(self, activity_type: Option<String>, limit: Option<usize>) -> ActivityFilter {
        ActivityFilter {
            activity_type,
            since: self.since,
            until: self.until,
            limit,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import activity summaries and track files, then show statistics
    Import {
        /// Activity export CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Directory of track files
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Leave activities that already have streams alone
        #[arg(long)]
        skip_existing: bool,
    },

    /// Import activity summaries only
    ImportActivities {
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Import track files only
    ImportStreams {
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        skip_existing: bool,
    },

    /// List activities, newest first
    List {
        /// Filter by activity type (Run, Ride, ...)
        #[arg(short = 't', long = "type")]
        activity_type: Option<String>,

        /// Maximum number of activities
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        range: DateRange,
    },

    /// List activities that have stream data
    Streams,

    /// Show one activity's stream analysis
    Show {
        /// Activity ID
        activity_id: i64,
    },

    /// Heart-rate zone distribution across activities
    Zones {
        #[arg(short = 't', long = "type")]
        activity_type: Option<String>,

        #[command(flatten)]
        range: DateRange,
    },

    /// Distance and moving time per week and activity type
    Weekly {
        #[arg(short = 't', long = "type")]
        activity_type: Option<String>,

        #[command(flatten)]
        range: DateRange,
    },

    /// Pace and heart-rate summary over runs, commutes excluded
    Runs {
        #[command(flatten)]
        range: DateRange,
    },

    /// Top performances per race distance
    Races,

    /// Show statistics
    Stats,

    /// Delete an activity and its streams
    Delete {
        /// Activity ID
        activity_id: i64,
    },
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trainlog=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config)?;

    // Initialize store and the cached read layer over it
    let store = ActivityStore::open(&config.database_path())?;
    let queries = QueryLayer::new(&store);

    match cli.command {
        Commands::Import {
            csv,
            dir,
            skip_existing,
        } => {
            let options = ImportOptions {
                csv,
                dir,
                skip_existing,
            };
            import::all(&queries, &config, &options)?;
        }
        Commands::ImportActivities { csv } => {
            let options = ImportOptions {
                csv,
                ..Default::default()
            };
            import::activities(&queries, &config, &options)?;
        }
        Commands::ImportStreams { dir, skip_existing } => {
            let options = ImportOptions {
                dir,
                skip_existing,
                ..Default::default()
            };
            import::streams(&queries, &config, &options)?;
        }
        Commands::List {
            activity_type,
            limit,
            range,
        } => {
            list::run(&queries, &range.filter(activity_type, limit))?;
        }
        Commands::Streams => {
            list::streams(&queries)?;
        }
        Commands::Show { activity_id } => {
            show::run(&queries, &config.zones, activity_id)?;
        }
        Commands::Zones {
            activity_type,
            range,
        } => {
            zones::run(&queries, &config.zones, &range.filter(activity_type, None))?;
        }
        Commands::Weekly {
            activity_type,
            range,
        } => {
            weekly::run(&queries, &range.filter(activity_type, None))?;
        }
        Commands::Runs { range } => {
            runs::run(&queries, &range.filter(Some("Run".to_string()), None))?;
        }
        Commands::Races => {
            races::run(&queries, &config)?;
        }
        Commands::Stats => {
            stats::run(&queries)?;
        }
        Commands::Delete { activity_id } => {
            delete::run(&queries, activity_id)?;
        }
    }

    Ok(())
}
