//! Line-oriented record files and compact-document files.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use camino::Utf8Path;
use placepack_core::{CompactDocument, PlacementRecord};
use placepack_fs::{create_utf8_file, open_utf8_file};

use crate::CliError;

/// Read one JSON object per line into placement records.
///
/// Blank lines are skipped; any malformed line fails the whole read with its
/// one-based line number, before the caller sees a partial record set.
pub(crate) fn read_records(path: &Utf8Path) -> Result<Vec<PlacementRecord>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, read) in reader.lines().enumerate() {
        let line = read.map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| CliError::ParseRecord {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Write records as one JSON object per line, in the order given.
pub(crate) fn write_records(
    path: &Utf8Path,
    records: &[PlacementRecord],
) -> Result<(), CliError> {
    let file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    for record in records {
        let line = serde_json::to_string(record).map_err(CliError::SerialiseReport)?;
        writeln!(writer, "{line}").map_err(|source| CliError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })?;
    }
    writer.flush().map_err(|source| CliError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole compact document.
pub(crate) fn read_document(path: &Utf8Path) -> Result<CompactDocument, CliError> {
    let mut file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut payload = String::new();
    file.read_to_string(&mut payload)
        .map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
    CompactDocument::from_json(&payload).map_err(|source| CliError::ParseDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a compact document as a single JSON value.
pub(crate) fn write_document(
    path: &Utf8Path,
    document: &CompactDocument,
) -> Result<(), CliError> {
    let payload = document.to_json().map_err(CliError::SerialiseOutput)?;
    let mut file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(payload.as_bytes())
        .map_err(|source| CliError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(b"\n").map_err(|source| CliError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}
