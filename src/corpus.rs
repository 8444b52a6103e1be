//! JSON-lines corpus reading and writing.
//!
//! Every corpus handled by figtag is stored one JSON object per line. Blank
//! lines are skipped on read; writes go to a temporary file in the target
//! directory that is then persisted over the destination, so a failed run
//! never leaves a truncated output behind.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::{CaptionRow, FigureRecord, LabelledRow};

/// Errors that can occur while reading or writing a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be opened, read or written.
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not a valid record.
    #[error("malformed record on line {line}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("failed to serialize record")]
    Serialize(#[source] serde_json::Error),

    /// A row read as labelled lacks its tag columns.
    #[error("row has no valid '{field}' column")]
    Unlabelled { field: &'static str },
}

/// Parses JSON-lines records from a reader.
///
/// # Errors
///
/// Returns `CorpusError::Json` with the 1-based line number of the first
/// malformed record.
pub fn parse_jsonl<T: DeserializeOwned>(reader: impl BufRead) -> Result<Vec<T>, CorpusError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CorpusError::Io {
            path: PathBuf::from("<reader>"),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| CorpusError::Json {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads a JSON-lines file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a line is malformed.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CorpusError> {
    let file = File::open(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_jsonl(BufReader::new(file)).map_err(|err| match err {
        CorpusError::Io { source, .. } => CorpusError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Writes records as JSON lines, replacing `path` atomically.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<(), CorpusError> {
    let io_error = |source: std::io::Error| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        for record in records {
            serde_json::to_writer(&mut writer, record).map_err(CorpusError::Serialize)?;
            writer.write_all(b"\n").map_err(io_error)?;
        }
        writer.flush().map_err(io_error)?;
    }
    temp.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Reads a caption corpus.
///
/// # Errors
///
/// See [`read_jsonl`].
pub fn read_rows(path: &Path) -> Result<Vec<CaptionRow>, CorpusError> {
    read_jsonl(path)
}

/// Reads a labelled corpus; every row must carry `tag` and `label`.
///
/// # Errors
///
/// See [`read_jsonl`].
pub fn read_labelled(path: &Path) -> Result<Vec<LabelledRow>, CorpusError> {
    read_jsonl(path)
}

/// Reads a figure corpus.
///
/// # Errors
///
/// See [`read_jsonl`].
pub fn read_figures(path: &Path) -> Result<Vec<FigureRecord>, CorpusError> {
    read_jsonl(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    #[test]
    fn parse_skips_blank_lines() {
        let input = "{\"caption\":\"a\"}\n\n   \n{\"caption\":null}\n";
        let rows: Vec<CaptionRow> = parse_jsonl(Cursor::new(input)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].caption(), Some("a"));
        assert_eq!(rows[1].caption(), None);
    }

    #[test]
    fn parse_reports_line_number_of_malformed_record() {
        let input = "{\"caption\":\"a\"}\n\n{not json}\n";
        let err = parse_jsonl::<CaptionRow>(Cursor::new(input)).unwrap_err();

        assert!(matches!(err, CorpusError::Json { line: 3, .. }));
    }

    #[test]
    fn write_then_read_preserves_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        let line = r#"{"pii":"S1","figure_id":"f1","caption":"TEM"}"#;
        let rows: Vec<CaptionRow> = parse_jsonl(Cursor::new(line)).unwrap();

        write_jsonl(&path, &rows).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("{line}\n"));
        assert_eq!(read_rows(&path).unwrap(), rows);
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        fs::write(&path, "stale content\n").unwrap();

        write_jsonl::<CaptionRow>(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn read_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jsonl");

        let err = read_rows(&path).unwrap_err();
        match err {
            CorpusError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn read_labelled_rejects_untagged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labelled.jsonl");
        fs::write(&path, "{\"caption\":\"TEM\"}\n").unwrap();

        let err = read_labelled(&path).unwrap_err();
        assert!(matches!(err, CorpusError::Json { line: 1, .. }));
    }
}
