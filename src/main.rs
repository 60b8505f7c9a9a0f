mod commands;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use streamcal_core::Settings;
use streamcal_core::date_window::parse_date;
use streamcal_core::discovery::Feed;
use streamcal_core::schedule::Granularity;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "streamcal")]
#[command(about = "Build a calendar of streaming releases and merge calendar sources")]
struct Cli {
    /// Log more (-v for progress, -vv for every skipped title)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ./streamcal.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch streaming releases from TMDB and write the release calendar
    Releases {
        /// Where to write the .ics file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// One event per day or one event per title
        #[arg(short, long, value_enum)]
        granularity: Option<GranularityArg>,

        /// Which TMDB listings to read
        #[arg(long, value_enum)]
        feed: Option<FeedArg>,

        /// Reference date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<String>,
    },
    /// Merge the calendars listed in a sources file into one calendar
    Merge {
        /// Sources list, one URL or path per line
        #[arg(short, long)]
        sources: Option<PathBuf>,

        /// Where to write the merged .ics file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep old generated events instead of pruning them
        #[arg(long)]
        no_prune: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GranularityArg {
    Daily,
    PerTitle,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Daily => Granularity::Daily,
            GranularityArg::PerTitle => Granularity::PerTitle,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FeedArg {
    Discover,
    NowPlaying,
}

impl From<FeedArg> for Feed {
    fn from(arg: FeedArg) -> Self {
        match arg {
            FeedArg::Discover => Feed::Discover,
            FeedArg::NowPlaying => Feed::NowPlaying,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Releases {
            output,
            granularity,
            feed,
            today,
        } => {
            if let Some(output) = output {
                settings.releases.output = output;
            }
            if let Some(granularity) = granularity {
                settings.releases.granularity = granularity.into();
            }
            if let Some(feed) = feed {
                settings.releases.feed = feed.into();
            }
            let today = today.as_deref().map(parse_date).transpose()?;
            commands::releases::run(&settings, today).await
        }
        Commands::Merge {
            sources,
            output,
            no_prune,
        } => {
            if let Some(sources) = sources {
                settings.merge.sources = sources;
            }
            if let Some(output) = output {
                settings.merge.output = output;
            }
            if no_prune {
                settings.merge.prune = false;
            }
            commands::merge::run(&settings.merge).await
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over the -v flags.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
