//! Toll pricing: per-vehicle rates from distance, then time-of-day and
//! day-of-week discounts.

use chrono::{NaiveTime, Weekday};

use crate::analyzers::types::{DistanceRow, TimedTollRow, TollRow, VehicleRates};
use crate::analyzers::utility::ensure_number;
use crate::config::{DayKind, RateSchedule};
use crate::error::{AnalyticsError, Result};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A day/time window to price a toll row for. Windows may not span days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_day: Weekday,
    pub start_time: NaiveTime,
    pub end_day: Weekday,
    pub end_time: NaiveTime,
}

impl Window {
    pub fn same_day(day: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_day: day,
            start_time,
            end_day: day,
            end_time,
        }
    }
}

/// Full English name of a weekday, as written in the datasets.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Adds a rate per vehicle class using the default coefficients.
pub fn calculate_toll_rate(rows: &[DistanceRow]) -> Result<Vec<TollRow>> {
    calculate_toll_rate_with(rows, &RateSchedule::default().coefficients)
}

/// Adds a rate per vehicle class: `distance * coefficient`.
pub fn calculate_toll_rate_with(
    rows: &[DistanceRow],
    coefficients: &VehicleRates,
) -> Result<Vec<TollRow>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let distance = ensure_number("distance", i, row.distance)?;
            Ok(TollRow::new(row, coefficients.scaled(distance)))
        })
        .collect()
}

/// Places `row` in the single band that contains `window`, snaps the window
/// to that band's bounds and applies its discount factor to every rate.
///
/// Fails if the window spans two days, runs backwards, or is not contained in
/// exactly one band.
pub fn tier_toll_row(
    row: &TollRow,
    window: Window,
    schedule: &RateSchedule,
) -> Result<TimedTollRow> {
    if window.start_day != window.end_day {
        return Err(AnalyticsError::validation(format!(
            "window {} {} - {} {} spans more than one day",
            day_name(window.start_day),
            window.start_time,
            day_name(window.end_day),
            window.end_time
        )));
    }
    if window.start_time > window.end_time {
        return Err(AnalyticsError::validation(format!(
            "window {}..{} ends before it starts",
            window.start_time, window.end_time
        )));
    }

    let mut matching = schedule
        .bands
        .iter()
        .filter(|b| b.contains(window.start_day, window.start_time, window.end_time));

    let band = match (matching.next(), matching.next()) {
        (Some(band), None) => band,
        (None, _) => {
            return Err(AnalyticsError::validation(format!(
                "no band contains {} {}..{}",
                day_name(window.start_day),
                window.start_time,
                window.end_time
            )));
        }
        (Some(_), Some(_)) => {
            return Err(AnalyticsError::validation(format!(
                "more than one band contains {} {}..{}",
                day_name(window.start_day),
                window.start_time,
                window.end_time
            )));
        }
    };

    let rates = row.rates().scaled(band.factor);
    let day = day_name(window.start_day).to_string();

    Ok(TimedTollRow {
        id_start: row.id_start,
        id_end: row.id_end,
        distance: row.distance,
        start_day: day.clone(),
        start_time: band.start,
        end_day: day,
        end_time: band.end,
        moto: rates.moto,
        car: rates.car,
        rv: rates.rv,
        bus: rates.bus,
        truck: rates.truck,
    })
}

/// Prices every row for every band of the week.
///
/// Each input row yields one output row per (day, band): Monday to Friday
/// through each weekday band, then Saturday and Sunday through each weekend
/// band. With the default schedule that is 17 rows per input row.
pub fn calculate_time_based_toll_rates(
    rows: &[DistanceRow],
    schedule: &RateSchedule,
) -> Result<Vec<TimedTollRow>> {
    schedule.validate()?;
    let tolls = calculate_toll_rate_with(rows, &schedule.coefficients)?;

    let weekday = schedule.bands_for(DayKind::Weekday);
    let weekend = schedule.bands_for(DayKind::Weekend);
    let per_row = 5 * weekday.len() + 2 * weekend.len();

    let mut out = Vec::with_capacity(tolls.len() * per_row);
    for toll in &tolls {
        for day in WEEK {
            let bands = match DayKind::of(day) {
                DayKind::Weekday => &weekday,
                DayKind::Weekend => &weekend,
            };
            for band in bands {
                let window = Window::same_day(day, band.start, band.end);
                out.push(tier_toll_row(toll, window, schedule)?);
            }
        }
    }

    Ok(out)
}
