//! CSV loading for the vehicle-count, timestamp and distance datasets.

use std::fs::File;
use std::io::Read;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

/// Deserializes every row of a headed CSV stream.
///
/// Columns not named by `T` are ignored.
///
/// # Errors
///
/// Returns [`AnalyticsError::Validation`](crate::error::AnalyticsError::Validation)
/// if a required column is missing or a value has the wrong type.
pub fn read_records_from<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result?;
        rows.push(record);
    }

    Ok(rows)
}

/// Reads every row of the CSV file at `path`.
pub fn read_records<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let rows: Vec<T> = read_records_from(file)?;
    debug!(path, rows = rows.len(), "Loaded CSV");
    Ok(rows)
}
