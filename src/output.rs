//! Output formatting and persistence for analytics results.
//!
//! Supports pretty-printing, JSON logging, and CSV files for row tables and
//! matrices.

use std::fmt::Debug;
use std::fs::File;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::matrix::LabeledMatrix;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    info!("{}", json);
    Ok(())
}

/// Writes rows to a CSV file at `path`, replacing any existing file.
///
/// The header comes from the field names of `T`.
pub fn write_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV records");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes a matrix as CSV: a header of column identifiers after an `id`
/// cell, then one line per row identifier.
pub fn write_matrix(path: &str, matrix: &LabeledMatrix) -> Result<()> {
    let (rows, cols) = matrix.shape();
    debug!(path, rows, cols, "Writing CSV matrix");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().from_writer(file);

    let mut header = Vec::with_capacity(cols + 1);
    header.push("id".to_string());
    header.extend(matrix.col_ids().iter().map(|id| id.to_string()));
    writer.write_record(&header)?;

    for (r, id) in matrix.row_ids().iter().enumerate() {
        let mut record = Vec::with_capacity(cols + 1);
        record.push(id.to_string());
        record.extend(matrix.row(r).iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::DistanceRow;
    use crate::error::AnalyticsError;
    use std::collections::BTreeMap;
    use std::env;
    use std::fs;
    use std::path::Path;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&DistanceRow::new(1, 2, 3.0));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&vec![DistanceRow::new(1, 2, 3.0)]).unwrap();
    }

    #[test]
    fn test_print_json_reports_json_error() {
        let mut by_pair = BTreeMap::new();
        by_pair.insert((1, 2), 3.0);
        assert!(matches!(print_json(&by_pair), Err(AnalyticsError::Json(_))));
    }

    #[test]
    fn test_write_records_header_and_rows() {
        let path = temp_path("toll_rater_test_records.csv");
        let _ = fs::remove_file(&path);

        let rows = vec![DistanceRow::new(1, 2, 3.5), DistanceRow::new(2, 1, 0.0)];
        write_records(&path, &rows).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["id_start,id_end,distance", "1,2,3.5", "2,1,0.0"]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_records_replaces_existing_file() {
        let path = temp_path("toll_rater_test_replace.csv");
        let rows = vec![DistanceRow::new(1, 2, 3.5)];
        write_records(&path, &rows).unwrap();
        write_records(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_matrix_layout() {
        let path = temp_path("toll_rater_test_matrix.csv");
        let mut matrix = LabeledMatrix::zeros([1, 2], [1, 2]);
        *matrix.at_mut(0, 1) = 5.5;
        write_matrix(&path, &matrix).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["id,1,2", "1,0,5.5", "2,0,0"]);

        fs::remove_file(&path).unwrap();
    }
}
