//! JSON line-delimited logging of enhancement runs.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::enhance::Strategy;
use crate::image::ImageStatistics;

fn log_dir() -> io::Result<()> {
    fs::create_dir_all("logs")
}

fn append_json_line<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    serde_json::to_writer(&mut file, value)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    file.write_all(b"\n")
}

#[derive(Debug, Serialize)]
pub struct EnhancementLogEntry {
    pub strategy: Strategy,
    pub timestamp_ms: u128,
    pub height: usize,
    pub width: usize,
    pub input_mean: [f32; 3],
    pub output_mean: [f32; 3],
    pub output_min: f32,
    pub output_max: f32,
}

pub fn log_enhancement(
    strategy: Strategy,
    height: usize,
    width: usize,
    input: &ImageStatistics,
    output: &ImageStatistics,
) -> io::Result<()> {
    log_dir()?;
    let entry = EnhancementLogEntry {
        strategy,
        timestamp_ms: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
        height,
        width,
        input_mean: input.mean_channels,
        output_mean: output.mean_channels,
        output_min: output.min,
        output_max: output.max,
    };
    append_json_line("logs/enhancements.jsonl", &entry)
}
