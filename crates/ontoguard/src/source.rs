//! Record source boundary: the connector contract the engine consumes.
//!
//! Connectors are external collaborators; this module only fixes their
//! interface plus two minimal adapters (in-memory and CSV) so the engine and
//! its tests have a concrete stream to pull from.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// One input record: an ordered mapping from column name to value.
pub type Record = IndexMap<String, Value>;

/// The single error type record sources surface. The engine wraps it into
/// `RunError` together with the partial report.
#[derive(Debug, Clone, Error)]
#[error("record source error: {message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    /// Create a source error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The underlying message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A finite, ordered, restartable sequence of records.
///
/// `open` may be called any number of times; every call yields the same
/// sequence from the beginning. The iterator is lazy so the engine never
/// needs the whole dataset in memory.
pub trait RecordSource: Send + Sync {
    /// Open the stream from the start.
    fn open(&self) -> Result<RecordIter<'_>, SourceError>;
}

/// Boxed record iterator returned by [`RecordSource::open`].
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record, SourceError>> + Send + 'a>;

/// In-memory record source, mainly for tests and small datasets.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    records: Vec<Record>,
}

impl VecSource {
    /// Create a source over the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for VecSource {
    fn open(&self) -> Result<RecordIter<'_>, SourceError> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }
}

/// CSV-backed record source. Every `open` re-reads the file, which makes the
/// source restartable as long as the file is not modified between runs.
///
/// Cells are kept as strings except empty/NA-like cells, which become null;
/// typed interpretation is left to the rules.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    /// Create a comma-delimited source for the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
        }
    }

    /// Set the delimiter (e.g. `b'\t'` for TSV).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn cell_value(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
        {
            Value::Null
        } else {
            Value::String(trimmed.to_string())
        }
    }
}

impl RecordSource for CsvSource {
    fn open(&self) -> Result<RecordIter<'_>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let iter = reader.into_records().map(move |row| {
            let row = row?;
            let mut record = Record::new();
            for (idx, header) in headers.iter().enumerate() {
                let raw = row.get(idx).unwrap_or("");
                record.insert(header.clone(), Self::cell_value(raw));
            }
            Ok(record)
        });

        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_vec_source_restartable() {
        let source = VecSource::new(vec![
            record(&[("a", Value::from(1))]),
            record(&[("a", Value::from(2))]),
        ]);

        let first: Vec<Record> = source.open().unwrap().map(|r| r.unwrap()).collect();
        let second: Vec<Record> = source.open().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_csv_source_reads_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sample_id,age\nS001,25\nS002,NA").unwrap();

        let source = CsvSource::new(file.path());
        let records: Vec<Record> = source.open().unwrap().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["sample_id"], Value::String("S001".into()));
        assert_eq!(records[0]["age"], Value::String("25".into()));
        assert_eq!(records[1]["age"], Value::Null);
    }

    #[test]
    fn test_csv_source_restartable() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x\n1\n2\n3").unwrap();

        let source = CsvSource::new(file.path());
        let first: Vec<Record> = source.open().unwrap().map(|r| r.unwrap()).collect();
        let second: Vec<Record> = source.open().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_csv_source_missing_file() {
        let source = CsvSource::new("/nonexistent/path.csv");
        assert!(source.open().is_err());
    }
}
