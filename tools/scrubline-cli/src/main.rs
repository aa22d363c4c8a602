//! Scrubline CLI: filmstrip extraction and timeline simulation.
//!
//! Usage:
//!   scrubline check                 Check ffmpeg/ffprobe and configuration
//!   scrubline map <OFFSET>          Show window times for a scroll offset
//!   scrubline frames <VIDEO>        Extract the filmstrip for a video
//!   scrubline simulate <SCRIPT>     Replay a JSONL host event script
//!   scrubline config                Show or write the configuration

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use scrubline_common::config::ScrublineConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "scrubline",
    about = "Scrubbable filmstrip timeline for video trimming",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the XDG config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check external tools and configuration
    Check,

    /// Show the selection window for a scroll offset
    Map {
        /// Horizontal scroll offset in pixels
        #[arg(allow_hyphen_values = true)]
        offset: f64,

        /// Video duration; enables seek clamping and frame lookup
        #[arg(long)]
        duration: Option<f64>,

        /// Also show the offset that puts the pop line at this time
        #[arg(long)]
        at: Option<f64>,
    },

    /// Extract the thumbnail filmstrip for a video
    Frames {
        /// Path to the video file
        video: PathBuf,

        /// Override the frame cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Print the frame snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a JSONL script of host events and print player commands
    Simulate {
        /// Path to the event script
        script: PathBuf,

        /// Run ffmpeg for `loaded` events instead of a dry run
        #[arg(long)]
        extract: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the configuration file
        #[arg(long)]
        write: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ScrublineConfig> {
    match path {
        Some(path) => ScrublineConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ScrublineConfig::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    scrubline_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Check => commands::check::run(&config, cli.config.as_deref()),
        Commands::Map {
            offset,
            duration,
            at,
        } => commands::map::run(&config, offset, duration, at),
        Commands::Frames {
            video,
            cache_dir,
            json,
        } => commands::frames::run(config, video, cache_dir, json).await,
        Commands::Simulate { script, extract } => {
            commands::simulate::run(&config, script, extract).await
        }
        Commands::Config { write } => commands::config::run(&config, cli.config, write),
    }
}
