//! Bar history loading.
//!
//! Accepts CSV files with a header row and either `time,open,high,low,close`
//! (extra columns ignored) or `time,price` columns. Time may be RFC 3339,
//! `%Y-%m-%d %H:%M:%S` (UTC assumed) or unix seconds.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;

use crate::model::Bar;

pub fn load_bars(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open bar file {}", path.display()))?;

    let mut bars = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let time_str = record.get(0).context("Missing time column")?;
        let close_time = parse_time(time_str)?;

        let field = |i: usize, name: &str| -> Result<f64> {
            record
                .get(i)
                .with_context(|| format!("Missing {} column in row {}", name, row_idx + 1))?
                .parse::<f64>()
                .with_context(|| format!("Failed to parse {} in row {}", name, row_idx + 1))
        };

        let bar = if record.len() >= 5 {
            Bar::new(
                close_time,
                field(1, "open")?,
                field(2, "high")?,
                field(3, "low")?,
                field(4, "close")?,
            )
        } else {
            Bar::flat(close_time, field(1, "price")?)
        };
        bars.push(bar);
    }

    log::info!("Loaded {} bars from {}", bars.len(), path.display());
    Ok(bars)
}

fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc));
    }
    let secs: i64 = s
        .parse()
        .with_context(|| format!("Failed to parse datetime: {}", s))?;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .with_context(|| format!("Timestamp out of range: {}", s))
}
