//! Watch command implementation.
//!
//! Connects to a camera, opens a frame stream, and paints each rendered
//! frame in place. A frame that fails to render (degenerate color range)
//! is skipped and the previous image stays on screen.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use thermaview_core::device::ConnectionConfig;
use thermaview_core::{Device, FrameStream, SessionOptions};
use thermaview_render::{RenderedFrame, render};
use thermaview_types::{DisplaySettings, FrameStats};

use crate::cli::OutputFormat;
use crate::display;

/// Arguments for the watch command.
pub struct WatchArgs {
    pub device: String,
    pub timeout: u64,
    pub min_range: u8,
    pub max_range: u8,
    pub mark_min: bool,
    pub mark_max: bool,
    pub raw: bool,
    pub frames: u32,
    pub stats_only: bool,
    pub format: OutputFormat,
}

pub async fn cmd_watch(args: WatchArgs) -> Result<()> {
    let settings = DisplaySettings::builder()
        .min_range(args.min_range)
        .max_range(args.max_range)
        .mark_min(args.mark_min)
        .mark_max(args.mark_max)
        .raw_mode(args.raw)
        .build();

    if settings.is_inverted() {
        eprintln!(
            "Warning: --min-range {} is above --max-range {}; every cell will be out of range.",
            settings.min_range, settings.max_range
        );
    }

    let config =
        ConnectionConfig::default().connection_timeout(Duration::from_secs(args.timeout));
    let device = Arc::new(
        Device::connect_with_config(&args.device, config)
            .await
            .with_context(|| format!("Failed to connect to '{}'", args.device))?,
    );

    let stream = FrameStream::open(Arc::clone(&device), SessionOptions::default())
        .await
        .context("Failed to subscribe to the matrix stream")?;

    let result = watch_loop(&args, settings, stream).await;

    device.disconnect().await.ok();
    result
}

async fn watch_loop(
    args: &WatchArgs,
    settings: DisplaySettings,
    mut stream: FrameStream,
) -> Result<()> {
    let mut stdout = io::stdout();
    let painting = !args.stats_only;

    if painting {
        display::enter(&mut stdout)?;
    } else {
        eprintln!(
            "Watching {} | Press Ctrl+C to stop",
            stream.device().name().unwrap_or(args.device.as_str())
        );
    }

    let mut frames_shown: u32 = 0;

    let outcome = loop {
        let next = tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            next = stream.next() => next,
        };

        let matrix = match next {
            Some(Ok(matrix)) => matrix,
            Some(Err(e)) => {
                tracing::warn!("frame error: {}", e);
                continue;
            }
            None => break Ok(()),
        };

        let frame = match render(&matrix, &settings) {
            Ok(frame) => frame,
            Err(e) => {
                // Keep the previous image on screen.
                tracing::debug!("skipping unrenderable frame: {}", e);
                continue;
            }
        };

        if painting {
            show_frame(&mut stdout, &frame, args.format)?;
        } else {
            print_stats(&mut stdout, &frame.stats, args.format)?;
        }

        frames_shown += 1;
        if args.frames > 0 && frames_shown >= args.frames {
            break Ok(());
        }
    };

    if painting {
        display::leave(&mut stdout)?;
        println!();
    }
    if frames_shown > 0 {
        eprintln!("Displayed {} frame(s).", frames_shown);
    }

    stream.close().await.ok();
    outcome
}

fn show_frame(out: &mut impl Write, frame: &RenderedFrame, format: OutputFormat) -> Result<()> {
    display::draw_frame(out, &frame.image)?;
    print_stats(out, &frame.stats, format)
}

fn print_stats(out: &mut impl Write, stats: &FrameStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let line = serde_json::json!({
                "max": stats.max,
                "min": stats.min,
                "avg": stats.avg,
            });
            writeln!(out, "{line}")?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "max {:>3}  min {:>3}  avg {:>5.1}",
                stats.max, stats.min, stats.avg
            )?;
        }
    }
    out.flush()?;
    Ok(())
}
