use crate::error::{AnalyticsError, Result};

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to `decimals` places, ties to even (banker's rounding).
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Rejects NaN so that comparisons against thresholds stay total.
pub fn ensure_number(column: &str, row: usize, value: f64) -> Result<f64> {
    if value.is_nan() {
        return Err(AnalyticsError::validation(format!(
            "column `{}` at row {} is not a number",
            column, row
        )));
    }
    Ok(value)
}
