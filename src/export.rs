// src/export.rs
//
// Persistence for the finished event ledger. Export errors never touch the
// in-memory counts; they are surfaced to the caller after the run.

use crate::counting::CrossingRecord;
use crate::error::CounterError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

fn ensure_parent_dir(path: &Path) -> Result<(), CounterError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CounterError::Export(format!("{}: {}", parent.display(), e)))?;
        }
    }
    Ok(())
}

/// Write the vehicle log as CSV: header row, then one row per crossing in
/// ledger order, timestamps rendered as "12.34s".
pub fn write_csv(path: &Path, records: &[CrossingRecord]) -> Result<(), CounterError> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| CounterError::Export(format!("{}: {}", path.display(), e)))?;

    writer
        .write_record(["Vehicle ID", "Lane No.", "Timestamp (s)"])
        .map_err(|e| CounterError::Export(e.to_string()))?;

    for record in records {
        writer
            .write_record([
                record.track_id.to_string(),
                record.line_number.to_string(),
                record.timestamp_label(),
            ])
            .map_err(|e| CounterError::Export(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| CounterError::Export(e.to_string()))?;

    info!("📄 Vehicle log saved: {}", path.display());
    Ok(())
}

/// Write the event stream as JSONL, one record per line.
pub fn write_jsonl(path: &Path, records: &[CrossingRecord]) -> Result<(), CounterError> {
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .map_err(|e| CounterError::Export(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| CounterError::Export(e.to_string()))?;
        writeln!(writer, "{}", line).map_err(|e| CounterError::Export(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| CounterError::Export(e.to_string()))?;

    info!("💾 Event stream saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<CrossingRecord> {
        vec![
            CrossingRecord {
                track_id: 7,
                line_number: 1,
                timestamp_secs: 2.0,
            },
            CrossingRecord {
                track_id: 3,
                line_number: 2,
                timestamp_secs: 12.345,
            },
        ]
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("traffic_counter_{}_{}", std::process::id(), name))
    }

    #[test]
    fn csv_has_header_and_formatted_rows() {
        let path = temp_path("log.csv");
        write_csv(&path, &sample_records()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Vehicle ID,Lane No.,Timestamp (s)"));
        assert_eq!(lines.next(), Some("7,1,2.00s"));
        assert_eq!(lines.next(), Some("3,2,12.35s"));
        assert_eq!(lines.next(), None);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_run_exports_header_only() {
        let path = temp_path("empty.csv");
        write_csv(&path, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn jsonl_writes_one_object_per_line() {
        let path = temp_path("events.jsonl");
        write_jsonl(&path, &sample_records()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["track_id"], 7);
        assert_eq!(first["line_number"], 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn unwritable_path_is_an_export_error() {
        let path = Path::new("/proc/definitely/not/writable/log.csv");
        let err = write_csv(path, &sample_records()).unwrap_err();
        assert!(matches!(err, CounterError::Export(_)));
    }
}
