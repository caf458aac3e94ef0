//! CSV import of measurement frames in long format.
//!
//! Each row is `cycle,tag,value`. Rows may arrive in any order; they are
//! grouped by cycle and returned in ascending cycle order. Values are typed
//! by [`MeasurementValue::parse`]. An empty value leaves the tag out of the
//! frame, which the engine treats as unavailable.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::IoError;
use crate::engine::{MeasurementTable, MeasurementValue};

/// Reads frames from a CSV file.
///
/// # Errors
///
/// Returns an `IoError` if the file cannot be opened or a row is malformed.
pub fn load_frames(path: &Path) -> Result<Vec<MeasurementTable>, IoError> {
    let file = File::open(path).map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })?;
    read_frames(file)
}

/// Reads frames from any CSV source with a `cycle,tag,value` header.
///
/// # Errors
///
/// Returns an `IoError` on CSV syntax errors, a non-integer cycle, or an
/// empty tag.
pub fn read_frames(reader: impl Read) -> Result<Vec<MeasurementTable>, IoError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut frames: BTreeMap<usize, MeasurementTable> = BTreeMap::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 2;
        if record.len() != 3 {
            return Err(IoError::Frame {
                row,
                message: format!("expected 3 fields, found {}", record.len()),
            });
        }
        let cycle: usize = record[0].parse().map_err(|_| IoError::Frame {
            row,
            message: format!("cycle \"{}\" is not a non-negative integer", &record[0]),
        })?;
        let tag = &record[1];
        if tag.is_empty() {
            return Err(IoError::Frame {
                row,
                message: "empty tag".to_string(),
            });
        }

        let frame = frames.entry(cycle).or_default();
        if !record[2].is_empty() {
            frame.insert(tag, MeasurementValue::parse(&record[2]));
        }
    }

    Ok(frames.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_rows_by_cycle() {
        let csv = "cycle,tag,value\n\
                   1,TX1.KV,121.5\n\
                   0,TX1.KV,118\n\
                   0,TX1.LOC_REM,REMOTE\n\
                   1,TX1.TAP,3\n";
        let frames = read_frames(csv.as_bytes()).unwrap_or_default();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].get("TX1.KV"), Some(&MeasurementValue::Int(118)));
        assert_eq!(
            frames[0].get("TX1.LOC_REM"),
            Some(&MeasurementValue::Text("REMOTE".into()))
        );
        assert_eq!(frames[1].get("TX1.KV"), Some(&MeasurementValue::Float(121.5)));
        assert_eq!(frames[1].len(), 2);
    }

    #[test]
    fn empty_value_is_unavailable() {
        let csv = "cycle,tag,value\n0,CP1.CAP_BKR,\n0,CP1.BUS_BKR,CLOSE\n";
        let frames = read_frames(csv.as_bytes()).unwrap_or_default();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].get("CP1.CAP_BKR").is_none());
    }

    #[test]
    fn bad_cycle_reports_row() {
        let csv = "cycle,tag,value\n0,TX1.KV,120\nx,TX1.KV,121\n";
        let err = read_frames(csv.as_bytes()).err();
        assert!(matches!(err, Some(IoError::Frame { row: 3, .. })));
    }
}
