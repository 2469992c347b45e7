//! Output formatting and persistence for derived datasets.
//!
//! Supports serde-driven CSV records, hand-assembled CSV tables for grouped
//! statistics, compact JSON, and 4-space indented JSON for GeoJSON.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Renders an optional value as a CSV cell; missing values become empty cells.
pub fn format_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

/// A CSV table with a fixed header, built up row by row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CsvTable {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a header column.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Writes the table to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        if self.is_empty() {
            warn!(path = %path.display(), "Writing a table with no rows");
        }
        let mut writer = WriterBuilder::new().from_writer(create_output(path)?);
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = self.rows.len(), "CSV table written");
        Ok(())
    }
}

/// Creates `path` for writing, creating missing parent directories.
fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Serializes `records` as CSV rows with a header line, replacing any existing file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    debug!(path = %path.display(), "Writing CSV records");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_writer(create_output(path)?);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "CSV records written");
    Ok(())
}

/// Writes `value` as compact JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut out = create_output(path)?;
    serde_json::to_writer(&mut out, value)?;
    out.flush()?;

    info!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes `value` as JSON indented by four spaces.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut out = create_output(path)?;
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.flush()?;

    info!(path = %path.display(), "Indented JSON written");
    Ok(())
}
