//! mugshot command-line entry point.

mod app;
mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Turn a photo into a mugshot using the remote image-effect API.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to process
    image: PathBuf,

    /// Directory the result is saved to (overrides the config file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file to use instead of the platform default
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result URL without downloading it
    #[arg(long)]
    no_download: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting mugshot");

    let config = config::Config::load(args.config.as_deref())?;
    tracing::debug!(api_base = %config.api_base, "configuration loaded");

    let options = app::Options {
        output_dir: args.output.unwrap_or_else(|| config.output_dir.clone()),
        image: args.image,
        download: !args.no_download,
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config, options))?;

    Ok(())
}
