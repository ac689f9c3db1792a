//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "thermaview")]
#[command(author, version, about = "Terminal viewer for 8x8 BLE thermal cameras", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan for nearby thermal cameras
    Scan {
        /// Scan timeout in seconds
        #[arg(short, long, default_value = "10")]
        timeout: u64,

        /// List every BLE device, not just thermal cameras
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Connect to a camera and display live frames
    Watch {
        /// Device name or address, or use THERMAVIEW_DEVICE env var
        #[arg(short, long, env = "THERMAVIEW_DEVICE")]
        device: String,

        /// Connection timeout in seconds
        #[arg(short = 'T', long, default_value = "30")]
        timeout: u64,

        /// Hide temperatures below this value (shown black)
        #[arg(long, default_value = "0")]
        min_range: u8,

        /// Hide temperatures above this value (shown white)
        #[arg(long, default_value = "100")]
        max_range: u8,

        /// Mark the coldest in-range cell with a blue square
        #[arg(long)]
        mark_min: bool,

        /// Mark the hottest in-range cell with a red square
        #[arg(long)]
        mark_max: bool,

        /// Show raw 8x8 blocks instead of the smoothed image
        #[arg(long)]
        raw: bool,

        /// Stop after this many frames (0 for unlimited)
        #[arg(long, default_value = "0")]
        frames: u32,

        /// Print per-frame statistics only, without the image
        #[arg(long)]
        stats_only: bool,

        /// Output format for statistics
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
