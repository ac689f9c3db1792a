//! Scan command implementation.

use anyhow::{Context, Result};
use thermaview_core::scan::{ScanOptions, scan_with_options};

use crate::cli::OutputFormat;

pub async fn cmd_scan(timeout: u64, all: bool, format: OutputFormat, quiet: bool) -> Result<()> {
    let mut options = ScanOptions::default().duration_secs(timeout);
    if all {
        options = options.all_devices();
    }

    let devices = scan_with_options(options)
        .await
        .context("Failed to scan for devices")?;

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = devices
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "name": d.name,
                        "address": d.address,
                        "identifier": d.identifier,
                        "rssi": d.rssi,
                        "thermal_camera": d.is_thermal_camera,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if devices.is_empty() {
                if !quiet {
                    println!("No devices found.");
                    if !all {
                        println!("Tip: pass --all to list every BLE device in range.");
                    }
                }
                return Ok(());
            }

            println!("{:<24} {:<40} {:>6}  {}", "NAME", "IDENTIFIER", "RSSI", "CAMERA");
            for device in &devices {
                let name = device.name.as_deref().unwrap_or("(unknown)");
                let rssi = device
                    .rssi
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let camera = if device.is_thermal_camera { "yes" } else { "" };
                println!(
                    "{:<24} {:<40} {:>6}  {}",
                    name, device.identifier, rssi, camera
                );
            }
            if !quiet {
                println!(
                    "\nFound {} device(s). Connect with: thermaview watch -d <identifier>",
                    devices.len()
                );
            }
        }
    }

    Ok(())
}
