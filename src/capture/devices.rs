use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// A capture device as reported by the capture tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDevice {
    pub index: u32,
    pub name: String,
}

/// Extract screen capture devices from ffmpeg's `-list_devices` diagnostics
pub fn parse_device_list(output: &str) -> Vec<CaptureDevice> {
    let re = Regex::new(r"\[(\d+)\] (Capture screen \d+)").expect("device pattern is valid");

    re.captures_iter(output)
        .filter_map(|caps| {
            let index = caps[1].parse::<u32>().ok()?;
            Some(CaptureDevice {
                index,
                name: caps[2].to_string(),
            })
        })
        .collect()
}

/// Ask the capture tool for its devices
///
/// ffmpeg exits non-zero for `-list_devices` and prints the list to stderr,
/// so the exit status is ignored.
pub async fn enumerate_devices(program: &str, input_format: &str) -> Result<Vec<CaptureDevice>> {
    let output = Command::new(program)
        .args(["-f", input_format, "-list_devices", "true", "-i", ""])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("Failed to run {} for device listing", program))?;

    let diagnostics = String::from_utf8_lossy(&output.stderr);
    debug!("Device listing output:\n{}", diagnostics);

    let devices = parse_device_list(&diagnostics);
    info!("Found {} capture devices", devices.len());

    Ok(devices)
}
