//! Analytics over the vehicle-count and timestamp datasets.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Weekday;
use tracing::warn;

use crate::analyzers::types::{NodeId, RouteId, TimestampRow, VehicleCountRow};
use crate::analyzers::utility::{ensure_number, mean, round_half_even};
use crate::error::{AnalyticsError, Result};
use crate::matrix::LabeledMatrix;

/// Average truck count a route has to exceed to be reported.
const ROUTE_TRUCK_THRESHOLD: f64 = 7.0;

/// Cells above this value get the reduced multiplier.
const MULTIPLY_THRESHOLD: f64 = 20.0;
const MULTIPLY_HIGH: f64 = 0.75;
const MULTIPLY_LOW: f64 = 1.25;

/// Category of a `car` count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CarType {
    Low,
    Medium,
    High,
}

impl CarType {
    /// Bins are `(-inf, 15)`, `[15, 25)` and `[25, inf)`.
    pub fn classify(car: f64) -> Option<CarType> {
        match car {
            c if c.is_nan() => None,
            c if c < 15.0 => Some(CarType::Low),
            c if c < 25.0 => Some(CarType::Medium),
            _ => Some(CarType::High),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CarType::Low => "low",
            CarType::Medium => "medium",
            CarType::High => "high",
        }
    }
}

/// Pivots `car` values into an `id_1 × id_2` matrix.
///
/// Missing pairs are 0 and cells where `id_1 == id_2` are forced to 0. When a
/// pair occurs more than once the last row wins.
pub fn generate_car_matrix(rows: &[VehicleCountRow]) -> Result<LabeledMatrix> {
    let mut matrix = LabeledMatrix::zeros(
        rows.iter().map(|r| r.id_1),
        rows.iter().map(|r| r.id_2),
    );

    let mut seen: HashMap<(NodeId, NodeId), usize> = HashMap::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let car = ensure_number("car", i, row.car)?;
        if let Some(previous) = seen.insert((row.id_1, row.id_2), i) {
            warn!(
                id_1 = row.id_1,
                id_2 = row.id_2,
                previous,
                row = i,
                "Duplicate car-matrix pair, keeping the later row"
            );
        }
        // Both ids were collected from `rows`, so the lookups cannot miss.
        if let (Some(r), Some(c)) = (matrix.row_index(row.id_1), matrix.col_index(row.id_2)) {
            *matrix.at_mut(r, c) = car;
        }
    }

    matrix.clear_diagonal();
    Ok(matrix)
}

/// Counts rows per car type. All three labels are always present, keyed in
/// lexicographic order (`high`, `low`, `medium`).
pub fn get_type_count(rows: &[VehicleCountRow]) -> Result<BTreeMap<&'static str, usize>> {
    let mut counts: BTreeMap<&'static str, usize> = [CarType::Low, CarType::Medium, CarType::High]
        .iter()
        .map(|t| (t.label(), 0))
        .collect();

    for (i, row) in rows.iter().enumerate() {
        let car_type = CarType::classify(row.car).ok_or_else(|| {
            AnalyticsError::validation(format!("row {} has no car type for value {}", i, row.car))
        })?;
        *counts.entry(car_type.label()).or_default() += 1;
    }

    Ok(counts)
}

/// Positions of rows whose `bus` value is more than twice the column mean.
///
/// Empty input returns an empty list.
pub fn get_bus_indexes(rows: &[VehicleCountRow]) -> Result<Vec<usize>> {
    let buses = rows
        .iter()
        .enumerate()
        .map(|(i, r)| ensure_number("bus", i, r.bus))
        .collect::<Result<Vec<f64>>>()?;

    let threshold = 2.0 * mean(&buses);

    Ok(buses
        .iter()
        .enumerate()
        .filter(|(_, bus)| **bus > threshold)
        .map(|(i, _)| i)
        .collect())
}

/// Routes whose average `truck` value is strictly greater than 7, ascending.
pub fn filter_routes(rows: &[VehicleCountRow]) -> Result<Vec<RouteId>> {
    let mut groups: BTreeMap<RouteId, (f64, usize)> = BTreeMap::new();

    for (i, row) in rows.iter().enumerate() {
        let truck = ensure_number("truck", i, row.truck)?;
        let entry = groups.entry(row.route).or_default();
        entry.0 += truck;
        entry.1 += 1;
    }

    Ok(groups
        .into_iter()
        .filter(|(_, (sum, count))| sum / *count as f64 > ROUTE_TRUCK_THRESHOLD)
        .map(|(route, _)| route)
        .collect())
}

/// Scales every cell by 0.75 if it is above 20 and by 1.25 otherwise, then
/// rounds to one decimal place (ties to even).
pub fn multiply_matrix(matrix: &LabeledMatrix) -> LabeledMatrix {
    matrix.map(|v| {
        let factor = if v > MULTIPLY_THRESHOLD {
            MULTIPLY_HIGH
        } else {
            MULTIPLY_LOW
        };
        round_half_even(v * factor, 1)
    })
}

/// For every `(id, id_2)` pair, whether its `startDay` values cover all seven
/// weekdays. Time of day is not considered. Keys are in ascending order.
pub fn time_check(rows: &[TimestampRow]) -> Result<BTreeMap<(NodeId, NodeId), bool>> {
    let mut groups: BTreeMap<(NodeId, NodeId), BTreeSet<u32>> = BTreeMap::new();

    for (i, row) in rows.iter().enumerate() {
        let day: Weekday = row.start_day.trim().parse().map_err(|_| {
            AnalyticsError::validation(format!(
                "row {} has unknown startDay `{}`",
                i, row.start_day
            ))
        })?;
        groups
            .entry((row.id, row.id_2))
            .or_default()
            .insert(day.num_days_from_monday());
    }

    Ok(groups
        .into_iter()
        .map(|(key, days)| (key, days.len() == 7))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_row(id_1: NodeId, id_2: NodeId, car: f64) -> VehicleCountRow {
        VehicleCountRow {
            id_1,
            id_2,
            route: 1,
            moto: 0.0,
            car,
            rv: 0.0,
            bus: 0.0,
            truck: 0.0,
        }
    }

    fn bus_row(bus: f64) -> VehicleCountRow {
        VehicleCountRow {
            bus,
            ..vehicle_row(1, 2, 0.0)
        }
    }

    fn truck_row(route: RouteId, truck: f64) -> VehicleCountRow {
        VehicleCountRow {
            route,
            truck,
            ..vehicle_row(1, 2, 0.0)
        }
    }

    fn day_row(id: NodeId, id_2: NodeId, day: &str) -> TimestampRow {
        TimestampRow {
            id,
            id_2,
            start_day: day.to_string(),
        }
    }

    #[test]
    fn test_car_matrix_scenario() {
        let rows = vec![vehicle_row(1, 2, 5.0), vehicle_row(2, 1, 8.0)];
        let m = generate_car_matrix(&rows).unwrap();
        assert_eq!(m.get(1, 2), Some(5.0));
        assert_eq!(m.get(2, 1), Some(8.0));
        assert_eq!(m.get(1, 1), Some(0.0));
        assert_eq!(m.get(2, 2), Some(0.0));
    }

    #[test]
    fn test_car_matrix_forces_diagonal_to_zero() {
        let rows = vec![vehicle_row(3, 3, 42.0), vehicle_row(3, 4, 1.0)];
        let m = generate_car_matrix(&rows).unwrap();
        assert_eq!(m.get(3, 3), Some(0.0));
        assert_eq!(m.get(3, 4), Some(1.0));
    }

    #[test]
    fn test_car_matrix_last_duplicate_wins() {
        let rows = vec![vehicle_row(1, 2, 5.0), vehicle_row(1, 2, 9.0)];
        let m = generate_car_matrix(&rows).unwrap();
        assert_eq!(m.get(1, 2), Some(9.0));
    }

    #[test]
    fn test_car_matrix_rejects_nan() {
        let rows = vec![vehicle_row(1, 2, f64::NAN)];
        assert!(matches!(
            generate_car_matrix(&rows),
            Err(AnalyticsError::Validation(_))
        ));
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(CarType::classify(14.999), Some(CarType::Low));
        assert_eq!(CarType::classify(15.0), Some(CarType::Medium));
        assert_eq!(CarType::classify(24.999), Some(CarType::Medium));
        assert_eq!(CarType::classify(25.0), Some(CarType::High));
        assert_eq!(CarType::classify(f64::NEG_INFINITY), Some(CarType::Low));
        assert_eq!(CarType::classify(f64::NAN), None);
    }

    #[test]
    fn test_type_count_keys_sorted_and_complete() {
        let rows = vec![
            vehicle_row(1, 2, 3.0),
            vehicle_row(1, 2, 15.0),
            vehicle_row(1, 2, 30.0),
            vehicle_row(1, 2, 25.0),
        ];
        let counts = get_type_count(&rows).unwrap();
        let keys: Vec<_> = counts.keys().copied().collect();
        assert_eq!(keys, vec!["high", "low", "medium"]);
        assert_eq!(counts["high"], 2);
        assert_eq!(counts["low"], 1);
        assert_eq!(counts["medium"], 1);

        let empty = get_type_count(&[]).unwrap();
        assert_eq!(empty.values().sum::<usize>(), 0);
        assert_eq!(empty.len(), 3);
    }

    #[test]
    fn test_bus_indexes_scenario() {
        let rows: Vec<_> = [4.0, 4.0, 4.0, 20.0].into_iter().map(bus_row).collect();
        assert_eq!(get_bus_indexes(&rows).unwrap(), vec![3]);
    }

    #[test]
    fn test_bus_indexes_empty() {
        assert!(get_bus_indexes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_filter_routes_strict_threshold() {
        let rows = vec![
            truck_row(3, 7.0),
            truck_row(3, 7.0),
            truck_row(1, 10.0),
            truck_row(1, 6.0),
            truck_row(2, 1.0),
            truck_row(5, 20.0),
        ];
        assert_eq!(filter_routes(&rows).unwrap(), vec![1, 5]);
    }

    #[test]
    fn test_multiply_boundary_and_rounding() {
        let mut m = LabeledMatrix::zeros([1, 2], [1, 2]);
        *m.at_mut(0, 1) = 20.0;
        *m.at_mut(1, 0) = 21.0;
        *m.at_mut(1, 1) = -4.0;
        let out = multiply_matrix(&m);
        assert_eq!(out.get(1, 2), Some(25.0));
        assert_eq!(out.get(2, 1), Some(15.8));
        assert_eq!(out.get(2, 2), Some(-5.0));
        assert_eq!(out.get(1, 1), Some(0.0));
        // input untouched
        assert_eq!(m.get(1, 2), Some(20.0));
    }

    #[test]
    fn test_time_check_full_week() {
        let days = [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ];
        let mut rows: Vec<_> = days.iter().map(|d| day_row(1, 2, d)).collect();
        rows.push(day_row(1, 2, "Monday"));
        rows.push(day_row(3, 4, "Monday"));
        rows.push(day_row(3, 4, "Sunday"));

        let result = time_check(&rows).unwrap();
        let entries: Vec<_> = result.into_iter().collect();
        assert_eq!(entries, vec![((1, 2), true), ((3, 4), false)]);
    }

    #[test]
    fn test_time_check_rejects_unknown_day() {
        let rows = vec![day_row(1, 2, "Funday")];
        assert!(matches!(
            time_check(&rows),
            Err(AnalyticsError::Validation(_))
        ));
    }
}
