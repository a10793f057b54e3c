//! Append-only dataset persistence with an enforced canonical schema.
//!
//! The downstream classifier was trained against one fixed column layout, so
//! every row appended here must present exactly that layout. A record that
//! lost features to failed plugins is default-filled under the established
//! header; a record carrying a key the schema has never seen is rejected —
//! silently writing a shifted row is the one failure mode this module exists
//! to prevent.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ExtractError;
use crate::features::{FeatureRecord, CANONICAL_COLUMNS, IMAGE_NAME_COLUMN};

/// Default cell for a statistic a degraded run lost. The identity column
/// defaults to empty instead, since "0" is not a filename.
const DEFAULT_STAT: &str = "0";

/// Sole writer of one dataset file. Appends serialize through the internal
/// mutex, so concurrent pipeline runs can share a writer without interleaving
/// partial rows.
pub struct DatasetWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DatasetWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as one row. Creates the file with the canonical
    /// header on first write; on every write, enforces that the record's
    /// keys fit the established column set exactly (missing keys are
    /// default-filled, unknown keys are a schema mismatch).
    pub fn append(&self, record: &FeatureRecord) -> Result<(), ExtractError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        for key in record.keys() {
            if !CANONICAL_COLUMNS.contains(&key) {
                return Err(ExtractError::SchemaMismatch {
                    reason: format!("record carries unknown column {key:?}"),
                });
            }
        }

        let needs_header = self.establish_header()?;

        let cells: Vec<String> = CANONICAL_COLUMNS
            .iter()
            .copied()
            .map(|column| match record.get(column) {
                Some(value) => escape(&value.to_string()),
                None if column == IMAGE_NAME_COLUMN => String::new(),
                None => DEFAULT_STAT.to_string(),
            })
            .collect();

        // The row is assembled in memory and written with a single call so
        // an I/O failure cannot leave half a row behind.
        let mut line = String::new();
        if needs_header {
            line.push_str(&CANONICAL_COLUMNS.join(","));
            line.push('\n');
        }
        line.push_str(&cells.join(","));
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;
        file.write_all(line.as_bytes())
            .map_err(|source| self.write_error(source))?;
        file.flush().map_err(|source| self.write_error(source))?;
        Ok(())
    }

    /// Check the established header, if any. Returns true when the file does
    /// not exist yet (or is empty) and the header still has to be written.
    fn establish_header(&self) -> Result<bool, ExtractError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(source) => return Err(self.write_error(source)),
        };

        let mut header = String::new();
        BufReader::new(file)
            .read_line(&mut header)
            .map_err(|source| self.write_error(source))?;
        let header = header.trim_end_matches(['\n', '\r']);
        if header.is_empty() {
            return Ok(true);
        }

        let established: Vec<&str> = header.split(',').collect();
        if established != CANONICAL_COLUMNS {
            return Err(ExtractError::SchemaMismatch {
                reason: format!(
                    "dataset {} was written with a different column set ({} columns, expected {})",
                    self.path.display(),
                    established.len(),
                    CANONICAL_COLUMNS.len()
                ),
            });
        }
        Ok(false)
    }

    fn write_error(&self, source: std::io::Error) -> ExtractError {
        ExtractError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Quote a cell if it contains a delimiter, quote, or line break.
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
