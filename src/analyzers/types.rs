//! Data types used by the analytics pipeline.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Identifier of a toll network node (`id_1`, `id_2`, `id_start`, `id_end`).
pub type NodeId = i64;

/// Route number from the vehicle-count dataset.
pub type RouteId = i64;

/// A single row of the vehicle-count dataset (dataset-1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleCountRow {
    pub id_1: NodeId,
    pub id_2: NodeId,
    pub route: RouteId,
    pub moto: f64,
    pub car: f64,
    pub rv: f64,
    pub bus: f64,
    pub truck: f64,
}

/// A single row of the timestamp dataset (dataset-2).
///
/// The completeness check only looks at the day a row starts on, so the
/// `startTime`, `endDay` and `endTime` columns are ignored when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampRow {
    pub id: NodeId,
    pub id_2: NodeId,
    #[serde(rename = "startDay")]
    pub start_day: String,
}

/// A distance between two nodes (dataset-3, and the unrolled form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRow {
    pub id_start: NodeId,
    pub id_end: NodeId,
    pub distance: f64,
}

impl DistanceRow {
    pub fn new(id_start: NodeId, id_end: NodeId, distance: f64) -> Self {
        Self {
            id_start,
            id_end,
            distance,
        }
    }
}

/// One value per vehicle class. Used both for coefficients and for rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleRates {
    pub moto: f64,
    pub car: f64,
    pub rv: f64,
    pub bus: f64,
    pub truck: f64,
}

impl VehicleRates {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            moto: self.moto * factor,
            car: self.car * factor,
            rv: self.rv * factor,
            bus: self.bus * factor,
            truck: self.truck * factor,
        }
    }

    /// `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("moto", self.moto),
            ("car", self.car),
            ("rv", self.rv),
            ("bus", self.bus),
            ("truck", self.truck),
        ]
        .into_iter()
    }
}

/// An unrolled distance row with a toll rate per vehicle class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TollRow {
    pub id_start: NodeId,
    pub id_end: NodeId,
    pub distance: f64,
    pub moto: f64,
    pub car: f64,
    pub rv: f64,
    pub bus: f64,
    pub truck: f64,
}

impl TollRow {
    pub fn new(row: &DistanceRow, rates: VehicleRates) -> Self {
        Self {
            id_start: row.id_start,
            id_end: row.id_end,
            distance: row.distance,
            moto: rates.moto,
            car: rates.car,
            rv: rates.rv,
            bus: rates.bus,
            truck: rates.truck,
        }
    }

    pub fn rates(&self) -> VehicleRates {
        VehicleRates {
            moto: self.moto,
            car: self.car,
            rv: self.rv,
            bus: self.bus,
            truck: self.truck,
        }
    }
}

/// A toll row classified into a day/time band with discounted rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedTollRow {
    pub id_start: NodeId,
    pub id_end: NodeId,
    pub distance: f64,
    pub start_day: String,
    pub start_time: NaiveTime,
    pub end_day: String,
    pub end_time: NaiveTime,
    pub moto: f64,
    pub car: f64,
    pub rv: f64,
    pub bus: f64,
    pub truck: f64,
}
