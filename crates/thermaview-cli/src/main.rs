use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod display;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            timeout,
            all,
            format,
        } => commands::scan::cmd_scan(timeout, all, format, cli.quiet).await,
        Commands::Watch {
            device,
            timeout,
            min_range,
            max_range,
            mark_min,
            mark_max,
            raw,
            frames,
            stats_only,
            format,
        } => {
            let args = commands::watch::WatchArgs {
                device,
                timeout,
                min_range,
                max_range,
                mark_min,
                mark_max,
                raw,
                frames,
                stats_only,
                format,
            };
            commands::watch::cmd_watch(args).await
        }
    }
}
