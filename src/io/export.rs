//! CSV export for cycle records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::runner::CycleRecord;

/// Column header for CSV cycle export.
const HEADER: &str = "cycle,day,nins,avg_kv,bal_mvar,dif_tap,cfail,in_band,taps,decisions,log";

/// Exports cycle records to a CSV file at the given path.
///
/// Writes a header row followed by one data row per cycle. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `records` - Complete run records
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[CycleRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes cycle records as CSV to any writer.
///
/// Multi-valued columns (`taps`, `decisions`) are joined with `;`; a
/// missing tap reading is written as an empty item.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[CycleRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for r in records {
        let taps: Vec<String> = r
            .taps
            .iter()
            .map(|t| t.map(|t| t.to_string()).unwrap_or_default())
            .collect();
        let decisions: Vec<String> = r.decisions.iter().map(ToString::to_string).collect();
        wtr.write_record(&[
            r.cycle.to_string(),
            r.day.to_string(),
            r.nins.to_string(),
            format!("{:.3}", r.avg_kv),
            format!("{:.3}", r.bal_mvar),
            r.dif_tap.to_string(),
            r.cfail.to_string(),
            r.in_band.to_string(),
            taps.join(";"),
            decisions.join(";"),
            r.log.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
