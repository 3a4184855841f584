//! Output formatting for pipeline rows.
//!
//! Supports JSON serialization and CSV export.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::File;
use std::io;
use std::path::Path;

/// Logs rows as pretty-printed JSON.
pub fn print_json<T: Serialize>(rows: &[T]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Writes rows to a CSV file with a header line, replacing any existing file.
pub fn write_records<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV records");

    write_csv(File::create(path)?, rows)
}

/// Writes rows as CSV with a header line to any writer, e.g. stdout.
pub fn write_csv<W: io::Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
