//! Persistence of weekly summaries with overwrite-by-window semantics.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{Writer, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::occupancy::WeeklyAggregate;

/// What a [`WeeklyStore::replace_window`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOutcome {
    /// The table did not exist and was created.
    pub created: bool,
    /// Stored rows removed because they fell inside the new batch's window.
    /// `None` when the store cannot know until the statements run.
    pub removed: Option<usize>,
    pub inserted: usize,
}

/// A table of weekly summaries.
///
/// `replace_window` creates the table when absent, deletes every stored row
/// whose `date_weekstarting` is on or after the earliest week in `rows`, then
/// inserts `rows`. An empty batch leaves the table untouched.
pub trait WeeklyStore {
    fn replace_window(&mut self, rows: &[WeeklyAggregate]) -> Result<StoreOutcome>;
}

/// Earliest `date_weekstarting` in the batch, the start of the replaced window.
pub fn earliest_week(rows: &[WeeklyAggregate]) -> Option<NaiveDate> {
    rows.iter().map(|r| r.date_weekstarting).min()
}

/// A CSV file used as the summary table.
pub struct CsvWeeklyStore {
    path: PathBuf,
}

impl CsvWeeklyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<WeeklyAggregate>> {
        let mut rdr = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            let record: WeeklyAggregate = result?;
            rows.push(record);
        }
        Ok(rows)
    }
}

/// Writes a CSV table through `fill` into a temporary file next to `path`,
/// then renames it over `path`. If `fill` or the flush fails, `path` keeps
/// its previous contents and the temporary file is removed.
fn replace_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut Writer<&mut NamedTempFile>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;

    {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(&mut tmp);
        fill(&mut writer)?;
        writer.flush()?;
    }

    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

impl WeeklyStore for CsvWeeklyStore {
    #[tracing::instrument(skip(self, rows), fields(path = %self.path.display(), rows = rows.len()))]
    fn replace_window(&mut self, rows: &[WeeklyAggregate]) -> Result<StoreOutcome> {
        let Some(from) = earliest_week(rows) else {
            info!("No weekly rows to store");
            return Ok(StoreOutcome::default());
        };

        let created = !self.path.exists();
        let existing = if created { Vec::new() } else { self.load()? };

        let before = existing.len();
        let kept: Vec<_> = existing
            .into_iter()
            .filter(|r| r.date_weekstarting < from)
            .collect();
        let removed = before - kept.len();
        debug!(%from, kept = kept.len(), removed, "Existing rows partitioned");

        replace_file(&self.path, |writer| {
            for row in kept.iter().chain(rows) {
                writer.serialize(row)?;
            }
            Ok(())
        })?;

        info!(created, removed, inserted = rows.len(), "Weekly rows stored");
        Ok(StoreOutcome {
            created,
            removed: Some(removed),
            inserted: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn week(start: NaiveDate, site: &str, patients_mean: f64) -> WeeklyAggregate {
        WeeklyAggregate {
            date_weekstarting: start,
            date_weekending: start + chrono::Duration::days(6),
            fin_year: "2023-24".into(),
            month: "Jan".into(),
            site_code: site.into(),
            patients_mean,
            arrivals_mean: 0.25,
            completeness: 1.0,
        }
    }

    #[test]
    fn test_earliest_week() {
        assert_eq!(earliest_week(&[]), None);
        assert_eq!(
            earliest_week(&[week(d(2024, 1, 15), "S1", 1.0), week(d(2024, 1, 8), "S2", 1.0)]),
            Some(d(2024, 1, 8))
        );
    }

    #[test]
    fn test_creates_table_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.csv");
        let mut store = CsvWeeklyStore::new(&path);

        let outcome = store.replace_window(&[week(d(2024, 1, 1), "S1", 2.5)]).unwrap();
        assert_eq!(
            outcome,
            StoreOutcome {
                created: true,
                removed: Some(0),
                inserted: 1,
            }
        );

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some(
                "date_weekstarting,date_weekending,fin_year,month,site_code,patients_mean,arrivals_mean,completeness"
            )
        );
        assert_eq!(lines.next(), Some("2024-01-01,2024-01-07,2023-24,Jan,S1,2.5,0.25,1.0"));
    }

    #[test]
    fn test_replaces_overlapping_weeks_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.csv");
        let mut store = CsvWeeklyStore::new(&path);

        store
            .replace_window(&[
                week(d(2024, 1, 1), "S1", 1.0),
                week(d(2024, 1, 8), "S1", 1.0),
                week(d(2024, 1, 15), "S1", 1.0),
            ])
            .unwrap();

        let outcome = store
            .replace_window(&[week(d(2024, 1, 8), "S1", 3.0), week(d(2024, 1, 22), "S1", 3.0)])
            .unwrap();
        assert_eq!(
            outcome,
            StoreOutcome {
                created: false,
                removed: Some(2),
                inserted: 2,
            }
        );

        let stored = store.load().unwrap();
        let summary: Vec<_> = stored
            .iter()
            .map(|r| (r.date_weekstarting, r.patients_mean))
            .collect();
        assert_eq!(
            summary,
            vec![
                (d(2024, 1, 1), 1.0),
                (d(2024, 1, 8), 3.0),
                (d(2024, 1, 22), 3.0),
            ]
        );
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.csv");
        let mut store = CsvWeeklyStore::new(&path);
        let batch = vec![week(d(2024, 1, 1), "S1", 1.5), week(d(2024, 1, 1), "S2", 0.5)];

        store.replace_window(&batch).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        store.replace_window(&batch).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_write_keeps_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.csv");
        let mut store = CsvWeeklyStore::new(&path);
        store.replace_window(&[week(d(2024, 1, 1), "S1", 1.5)]).unwrap();
        let before = fs::read(&path).unwrap();

        let err = replace_file(&path, |writer| {
            writer.serialize(week(d(2024, 1, 8), "S1", 9.0))?;
            anyhow::bail!("disk full")
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        assert_eq!(fs::read(&path).unwrap(), before);
        // the temporary file is cleaned up
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unreadable_table_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.csv");
        fs::write(&path, "date_weekstarting,site_code\nnot-a-date,S1\n").unwrap();
        let before = fs::read(&path).unwrap();

        let mut store = CsvWeeklyStore::new(&path);
        assert!(store.replace_window(&[week(d(2024, 1, 8), "S1", 1.0)]).is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_empty_batch_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly.csv");
        let mut store = CsvWeeklyStore::new(&path);

        assert_eq!(store.replace_window(&[]).unwrap(), StoreOutcome::default());
        assert!(!path.exists());
    }
}
