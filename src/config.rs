use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::analyzers::types::VehicleRates;
use crate::error::{AnalyticsError, Result};

/// Whether a band applies Monday–Friday or Saturday–Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    pub fn of(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => DayKind::Weekend,
            _ => DayKind::Weekday,
        }
    }
}

/// A time-of-day interval carrying a discount factor.
///
/// A band covers instants in `[start, end)`, except that a band ending at
/// 23:59:59 also covers 23:59:59 itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBand {
    pub days: DayKind,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub factor: f64,
}

impl TimeBand {
    pub fn covers(&self, t: NaiveTime) -> bool {
        t >= self.start && (t < self.end || (t == self.end && self.end == end_of_day()))
    }

    /// True if a same-day window `[start, end]` on `day` lies inside this band.
    pub fn contains(&self, day: Weekday, start: NaiveTime, end: NaiveTime) -> bool {
        DayKind::of(day) == self.days && self.covers(start) && end <= self.end
    }
}

/// Vehicle coefficients and time bands used to price tolls.
///
/// Stored as JSON on disk:
/// ```json
/// {
///   "coefficients": { "moto": 0.8, "car": 1.2, "rv": 1.5, "bus": 2.2, "truck": 3.6 },
///   "bands": [
///     { "days": "weekday", "start": "00:00:00", "end": "10:00:00", "factor": 0.8 },
///     { "days": "weekend", "start": "00:00:00", "end": "23:59:59", "factor": 0.7 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSchedule {
    pub coefficients: VehicleRates,
    pub bands: Vec<TimeBand>,
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self {
            coefficients: VehicleRates {
                moto: 0.8,
                car: 1.2,
                rv: 1.5,
                bus: 2.2,
                truck: 3.6,
            },
            bands: vec![
                TimeBand {
                    days: DayKind::Weekday,
                    start: hms(0, 0, 0),
                    end: hms(10, 0, 0),
                    factor: 0.8,
                },
                TimeBand {
                    days: DayKind::Weekday,
                    start: hms(10, 0, 0),
                    end: hms(18, 0, 0),
                    factor: 1.2,
                },
                TimeBand {
                    days: DayKind::Weekday,
                    start: hms(18, 0, 0),
                    end: end_of_day(),
                    factor: 0.8,
                },
                TimeBand {
                    days: DayKind::Weekend,
                    start: hms(0, 0, 0),
                    end: end_of_day(),
                    factor: 0.7,
                },
            ],
        }
    }
}

impl RateSchedule {
    /// Loads and validates a schedule from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let schedule: RateSchedule = serde_json::from_str(&content)
            .map_err(|e| AnalyticsError::validation(format!("invalid schedule {}: {}", path, e)))?;
        schedule.validate()?;
        Ok(schedule)
    }

    /// Bands for one kind of day, ordered by start time.
    pub fn bands_for(&self, kind: DayKind) -> Vec<&TimeBand> {
        let mut bands: Vec<&TimeBand> = self.bands.iter().filter(|b| b.days == kind).collect();
        bands.sort_by_key(|b| b.start);
        bands
    }

    /// Checks that coefficients and factors are non-negative numbers and that
    /// the bands of each day kind tile 00:00:00..=23:59:59 without gaps or
    /// overlaps.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.coefficients.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyticsError::validation(format!(
                    "coefficient `{}` must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        for kind in [DayKind::Weekday, DayKind::Weekend] {
            let bands = self.bands_for(kind);
            if bands.is_empty() {
                return Err(AnalyticsError::validation(format!(
                    "no {:?} bands configured",
                    kind
                )));
            }

            let mut cursor = NaiveTime::MIN;
            for band in &bands {
                if !band.factor.is_finite() || band.factor < 0.0 {
                    return Err(AnalyticsError::validation(format!(
                        "band starting {} has invalid factor {}",
                        band.start, band.factor
                    )));
                }
                if band.start >= band.end {
                    return Err(AnalyticsError::validation(format!(
                        "band {}..{} is empty",
                        band.start, band.end
                    )));
                }
                if band.start != cursor {
                    return Err(AnalyticsError::validation(format!(
                        "{:?} bands leave a gap or overlap at {}",
                        kind, cursor
                    )));
                }
                cursor = band.end;
            }

            if cursor != end_of_day() {
                return Err(AnalyticsError::validation(format!(
                    "{:?} bands end at {} instead of {}",
                    kind,
                    cursor,
                    end_of_day()
                )));
            }
        }

        Ok(())
    }
}

/// Last second of the day, the closing bound of the final band.
pub fn end_of_day() -> NaiveTime {
    hms(23, 59, 59)
}

fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap_or(NaiveTime::MIN)
}
