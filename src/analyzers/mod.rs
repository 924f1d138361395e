//! Table transformations over the vehicle-count, timestamp and distance
//! datasets.
//!
//! Every function takes typed rows, leaves its input untouched and returns a
//! freshly built result.

pub mod distance;
pub mod tolls;
pub mod types;
pub mod utility;
pub mod vehicles;
