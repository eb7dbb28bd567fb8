use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "showsplit",
    about = "Showsplit - Slice a weekly broadcast recording into its syndication cuts and ship them over FTP",
    version,
    long_about = "A CLI tool that turns one raw studio recording into a highlight clip, five \
satellite-feed segments and a stitched weekly podcast, tags the podcast with ID3 metadata, and \
uploads everything to the configured FTP destinations with retry and size verification."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one recording end to end: slice, tag and distribute
    Process {
        /// Broadcast date in MM-DD-YY form
        #[arg(long, value_name = "MM-DD-YY")]
        date: String,

        /// Path to the raw studio recording (16-bit PCM WAV)
        #[arg(long, value_name = "FILE")]
        source: PathBuf,

        /// Optional cover artwork to embed in the podcast (PNG)
        #[arg(long, value_name = "FILE")]
        artwork: Option<PathBuf>,

        /// Show title for the podcast tags
        #[arg(long, default_value = "")]
        title: String,

        /// Guest name for the podcast tags
        #[arg(long, default_value = "")]
        guest: String,
    },

    /// Show the segment timing tables and the filenames a date derives
    Plan {
        /// Broadcast date in MM-DD-YY form (defaults to today)
        #[arg(long, value_name = "MM-DD-YY")]
        date: Option<String>,
    },

    /// List the configured upload destinations and their delivery rules
    Destinations,

    /// Inspect the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
