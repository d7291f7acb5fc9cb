//! Append-only, CSV-backed item logs used to track batch job progress
//! across runs (completed items, items to skip, items dropped).
//!
//! Grounded 1:1 on `plastron-utils/src/plastron/utils/__init__.py::ItemLog`:
//! a CSV file with a declared field order and a designated key field; on
//! construction, existing keys are loaded eagerly into an in-memory set so
//! `contains()` is O(1) and a resumed job can skip what it already did.

use chrono::Utc;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItemLogError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("log row is missing its key field {0:?}")]
    MissingKeyField(String),
}

pub type ItemLogResult<T> = Result<T, ItemLogError>;

/// An append-only CSV log, keyed on one of its fields.
pub struct ItemLog {
    path: PathBuf,
    fieldnames: Vec<String>,
    keyfield: String,
    seen: HashSet<String>,
}

impl ItemLog {
    /// Opens (or prepares to create) a log at `path` with the given field
    /// order and key field. If the file already exists, every row's key is
    /// loaded into the in-memory `seen` set up front
    /// (`ItemLog._load_keys`); a fieldname mismatch against what's on disk
    /// is logged as a warning, not an error, matching the original's
    /// `__iter__` behavior.
    pub fn open(
        path: impl Into<PathBuf>,
        fieldnames: impl IntoIterator<Item = impl Into<String>>,
        keyfield: impl Into<String>,
    ) -> ItemLogResult<Self> {
        let path = path.into();
        let fieldnames: Vec<String> = fieldnames.into_iter().map(Into::into).collect();
        let keyfield = keyfield.into();

        let mut log = ItemLog { path, fieldnames, keyfield, seen: HashSet::new() };
        if log.path.exists() {
            log.load_keys()?;
        }
        Ok(log)
    }

    fn load_keys(&mut self) -> ItemLogResult<()> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers != self.fieldnames {
            tracing::warn!(
                path = %self.path.display(),
                expected = ?self.fieldnames,
                found = ?headers,
                "item log field names do not match, reading anyway"
            );
        }

        for record in reader.records() {
            let record = record?;
            if let Some(key) = self.key_from_record(&headers, &record) {
                self.seen.insert(key);
            }
        }
        Ok(())
    }

    fn key_from_record(&self, headers: &[String], record: &csv::StringRecord) -> Option<String> {
        let index = headers.iter().position(|h| h == &self.keyfield)?;
        record.get(index).map(str::to_string)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Appends one row, keyed by `row[self.keyfield]`. Writes a header
    /// first if the file doesn't exist yet.
    pub fn append(&mut self, row: &[(&str, &str)]) -> ItemLogResult<()> {
        let key = row
            .iter()
            .find(|(name, _)| *name == self.keyfield)
            .map(|(_, value)| value.to_string())
            .ok_or_else(|| ItemLogError::MissingKeyField(self.keyfield.clone()))?;

        let write_header = !self.path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        if write_header {
            writer.write_record(&self.fieldnames)?;
        }

        let ordered: Vec<&str> = self
            .fieldnames
            .iter()
            .map(|name| {
                row.iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| *v)
                    .unwrap_or("")
            })
            .collect();
        writer.write_record(&ordered)?;
        writer.flush()?;

        self.seen.insert(key);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A log that discards everything written to it, used where the caller
/// doesn't want a skip/drop log (e.g. `--no-transactions` test runs).
/// Grounded on `utils/__init__.py::NullLog`.
pub struct NullLog;

impl NullLog {
    pub fn append(&mut self, _row: &[(&str, &str)]) -> ItemLogResult<()> {
        Ok(())
    }

    pub fn contains(&self, _key: &str) -> bool {
        false
    }
}

/// A `skipped.<command>.<timestamp>.csv` filename, matching
/// `utils.py::datetimestamp`'s format.
pub fn timestamped_log_name(prefix: &str, command: &str) -> String {
    format!("{prefix}.{command}.{}.csv", Utc::now().format("%Y-%m-%dT%H:%M:%S%.fZ"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_contains() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completed.csv");
        let mut log = ItemLog::open(&path, ["number", "path", "uri"], "path").unwrap();

        assert!(!log.contains("item1"));
        log.append(&[("number", "1"), ("path", "item1"), ("uri", "http://ex.org/1")]).unwrap();
        assert!(log.contains("item1"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_reopen_loads_existing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completed.csv");
        {
            let mut log = ItemLog::open(&path, ["number", "path", "uri"], "path").unwrap();
            log.append(&[("number", "1"), ("path", "item1"), ("uri", "http://ex.org/1")]).unwrap();
        }
        let log = ItemLog::open(&path, ["number", "path", "uri"], "path").unwrap();
        assert!(log.contains("item1"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_missing_key_field_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completed.csv");
        let mut log = ItemLog::open(&path, ["number", "path"], "path").unwrap();
        assert!(log.append(&[("number", "1")]).is_err());
    }

    #[test]
    fn test_null_log_never_remembers() {
        let mut log = NullLog;
        log.append(&[("path", "item1")]).unwrap();
        assert!(!log.contains("item1"));
    }

    #[test]
    fn test_timestamped_log_name_has_csv_extension() {
        let name = timestamped_log_name("skipped", "load");
        assert!(name.starts_with("skipped.load."));
        assert!(name.ends_with(".csv"));
    }
}
