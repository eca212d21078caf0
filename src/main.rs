//! pollscrape: extract structured poll records from rendered polling pages

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{extract_files, harvest_pages, init_config, OutputFormat};
use pollscrape::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pollscrape")]
#[command(about = "Extract structured poll records from rendered polling pages")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "pollscrape.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract poll records from saved HTML files
    Extract {
        /// Rendered HTML files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// URL the files were saved from (resolves relative links)
        #[arg(long)]
        page_url: Option<String>,

        /// Maximum records to output
        #[arg(long)]
        max_records: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Fetch pages, extract polls and write a report
    Harvest {
        /// Page URLs (defaults to [harvest].pages)
        urls: Vec<String>,

        /// Report output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail when fewer records are found
        #[arg(long)]
        min_records: Option<usize>,

        /// Read pages from a snapshot directory instead of the network
        #[arg(long)]
        snapshots: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Output file or directory
        #[arg(default_value = "pollscrape.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file must not stop `init` from writing a fresh one
    let config = if matches!(cli.command, Commands::Init { .. }) {
        Config::default()
    } else {
        Config::load_or_default(&cli.config)?
    };
    config.logging.init(cli.verbose)?;
    tracing::debug!("Using config {}", cli.config.display());

    match cli.command {
        Commands::Extract {
            files,
            page_url,
            max_records,
            format,
        } => extract_files(config, files, page_url, max_records, format).await,
        Commands::Harvest {
            urls,
            output,
            min_records,
            snapshots,
        } => harvest_pages(config, urls, output, min_records, snapshots).await,
        Commands::Init { path, force } => init_config(path, force).await,
    }
}
