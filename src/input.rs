//! Readers for the flat-file inputs.
//!
//! Paths ending in `.gz` are decompressed on the fly, so archived copies of
//! the exercise data can be used without unpacking them first.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::report::Report;

/// Opens `path` for reading, transparently gunzipping `.gz` files.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        debug!(path = %path.display(), "Reading gzip-compressed input");
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Parses report rows from any CSV source.
///
/// Surrounding whitespace is stripped from every cell and header. Columns are
/// matched by header name; unknown columns are ignored.
///
/// # Errors
///
/// Fails on the first row with a malformed timestamp, number, or location,
/// naming the 1-based data row.
pub fn parse_reports<R: Read>(reader: R) -> Result<Vec<Report>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut reports = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        let report: Report = result.with_context(|| format!("invalid report on row {}", i + 1))?;
        reports.push(report);
    }

    Ok(reports)
}

/// Reads a report CSV from disk.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_reports(path: &Path) -> Result<Vec<Report>> {
    let reports = parse_reports(open_input(path)?)
        .with_context(|| format!("reading reports from {}", path.display()))?;
    info!(rows = reports.len(), "Reports loaded");
    Ok(reports)
}

/// Reads and deserializes a JSON document from disk.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = open_input(path)?;
    serde_json::from_reader(reader)
        .with_context(|| format!("parsing JSON from {}", path.display()))
}
