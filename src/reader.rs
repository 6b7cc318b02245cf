// 📂 Schema-Tolerant Reader
// Reads a tabular source restricted to the columns that actually exist.
//
// Contract:
// - absent file            → empty frame (never an error)
// - none of the columns    → empty frame
// - permissions/corruption → ReadError (caller decides if that is fatal)

use crate::error::ReadError;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

// ============================================================================
// FRAME
// ============================================================================

/// Frame - raw rows of one source, restricted to the selected columns.
///
/// Cells stay as strings here; typing happens when a frame is merged
/// into the region table.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    /// SHA-256 of the bytes read, `None` when the file was absent
    digest: Option<String>,
}

impl Frame {
    pub fn empty() -> Self {
        Frame::default()
    }

    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Frame {
            columns,
            rows,
            digest: None,
        }
    }

    /// True when the source contributed no columns at all.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

// ============================================================================
// READER TRAIT
// ============================================================================

/// TabularReader - the only seam between file formats and the pipeline.
///
/// Delimiters and encodings are an adapter concern; the merge engine only
/// ever sees `Frame`s.
pub trait TabularReader: Send + Sync {
    /// Read `path`, keeping only `columns` (all columns when `None`).
    fn read(&self, path: &Path, columns: Option<&[String]>) -> Result<Frame, ReadError>;

    /// Name used in logs
    fn name(&self) -> &str {
        "tabular"
    }
}

/// CSV implementation (header row followed by data rows).
#[derive(Debug, Clone)]
pub struct CsvReader {
    delimiter: u8,
}

impl CsvReader {
    pub fn new() -> Self {
        CsvReader { delimiter: b',' }
    }

    /// Builder: use a different field delimiter (e.g. `b'\t'`)
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn parse_bytes(
        &self,
        path: &Path,
        bytes: &[u8],
        columns: Option<&[String]>,
    ) -> Result<Frame, ReadError> {
        let malformed = |source: csv::Error| ReadError::Malformed {
            path: path.to_path_buf(),
            source,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(bytes);

        let header: Vec<String> = rdr
            .headers()
            .map_err(malformed)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let selection = select_columns(&header, columns);
        if selection.is_empty() {
            debug!(path = %path.display(), "no requested columns present");
            return Ok(Frame::empty());
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(malformed)?;
            rows.push(
                selection
                    .iter()
                    .map(|&idx| record.get(idx).unwrap_or("").to_string())
                    .collect(),
            );
        }

        Ok(Frame::new(
            selection.iter().map(|&idx| header[idx].clone()).collect(),
            rows,
        ))
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TabularReader for CsvReader {
    fn read(&self, path: &Path, columns: Option<&[String]>) -> Result<Frame, ReadError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "source absent");
                return Ok(Frame::empty());
            }
            Err(source) => {
                return Err(ReadError::Unavailable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut frame = self.parse_bytes(path, &bytes, columns)?;
        frame.digest = Some(sha256_hex(&bytes));
        Ok(frame)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Header indices to keep, in request order (header order when `None`).
/// Duplicate header names keep their first occurrence.
fn select_columns(header: &[String], columns: Option<&[String]>) -> Vec<usize> {
    let mut seen = HashSet::new();
    let first_index = |name: &str| header.iter().position(|h| h == name);

    match columns {
        Some(requested) => requested
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .filter_map(|name| first_index(name))
            .collect(),
        None => header
            .iter()
            .enumerate()
            .filter(|(_, name)| seen.insert(name.as_str()))
            .map(|(idx, _)| idx)
            .collect(),
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_file_is_empty_frame() {
        let dir = tempdir().unwrap();
        let frame = CsvReader::new()
            .read(&dir.path().join("nope.csv"), None)
            .unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.row_count(), 0);
        assert!(frame.digest().is_none());
    }

    #[test]
    fn test_reads_all_columns() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "Suburb,Price\nADELAIDE,500\nGLENELG,900\n");

        let frame = CsvReader::new().read(&path, None).unwrap();
        assert_eq!(frame.columns(), &cols(&["Suburb", "Price"])[..]);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.rows()[1][0], "GLENELG");
        assert!(frame.digest().is_some());
    }

    #[test]
    fn test_restricts_to_existing_columns() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "Suburb,Price,Noise\nADELAIDE,500,x\n");

        let wanted = cols(&["Suburb", "Price", "DoesNotExist"]);
        let frame = CsvReader::new().read(&path, Some(&wanted)).unwrap();

        assert_eq!(frame.columns(), &cols(&["Suburb", "Price"])[..]);
        assert!(!frame.has_column("Noise"));
        assert_eq!(frame.rows()[0], cols(&["ADELAIDE", "500"]));
    }

    #[test]
    fn test_no_requested_columns_is_empty() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "Suburb,Price\nADELAIDE,500\n");

        let wanted = cols(&["Other"]);
        let frame = CsvReader::new().read(&path, Some(&wanted)).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_duplicate_header_keeps_first() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "Suburb,Price,Price\nADELAIDE,1,2\n");

        let frame = CsvReader::new().read(&path, None).unwrap();
        assert_eq!(frame.columns().len(), 2);
        assert_eq!(frame.rows()[0][1], "1");
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "Suburb,Price\nADELAIDE,1,2,3\n");

        let result = CsvReader::new().read(&path, None);
        assert!(matches!(result, Err(ReadError::Malformed { .. })));
    }

    #[test]
    fn test_directory_is_unavailable() {
        let dir = tempdir().unwrap();
        let result = CsvReader::new().read(dir.path(), None);
        assert!(matches!(result, Err(ReadError::Unavailable { .. })));
    }

    #[test]
    fn test_tab_delimiter() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.tsv", "Suburb\tPrice\nADELAIDE\t500\n");

        let frame = CsvReader::new()
            .with_delimiter(b'\t')
            .read(&path, None)
            .unwrap();
        assert_eq!(frame.rows()[0][1], "500");
    }
}
