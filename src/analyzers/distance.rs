//! Symmetric distance matrix built from toll-segment distances, its unrolled
//! all-pairs form, and the percentage-threshold neighbour query.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::analyzers::types::{DistanceRow, NodeId};
use crate::analyzers::utility::{ensure_number, mean};
use crate::error::{AnalyticsError, Result};
use crate::matrix::{LabeledMatrix, sorted_unique};

/// Relative half-width of the neighbour window around the reference average.
const THRESHOLD_PERCENT: f64 = 0.1;

/// Square matrix over the identifier universe with zero diagonal.
///
/// # Examples
///
/// ```
/// use toll_rater::analyzers::distance::DistanceMatrix;
/// use toll_rater::analyzers::types::DistanceRow;
///
/// let rows = vec![DistanceRow::new(1, 2, 10.0), DistanceRow::new(2, 3, 5.0)];
/// let dm = DistanceMatrix::from_rows(&rows).unwrap();
/// assert_eq!(dm.get(2, 1), Some(10.0));
/// assert_eq!(dm.get(1, 3), Some(0.0));
/// assert_eq!(dm.unroll().len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    inner: LabeledMatrix,
}

impl DistanceMatrix {
    /// Builds the matrix by adding every row's distance to both `(start, end)`
    /// and `(end, start)`. Repeated pairs accumulate. Rows whose start equals
    /// their end are skipped.
    pub fn from_rows(rows: &[DistanceRow]) -> Result<Self> {
        let ids = universe(rows);
        let mut inner = LabeledMatrix::zeros(ids.iter().copied(), ids.iter().copied());

        for (i, row) in rows.iter().enumerate() {
            let distance = ensure_number("distance", i, row.distance)?;
            if row.id_start == row.id_end {
                debug!(id = row.id_start, row = i, "Skipping self-loop distance row");
                continue;
            }
            let (s, e) = match (inner.row_index(row.id_start), inner.row_index(row.id_end)) {
                (Some(s), Some(e)) => (s, e),
                _ => continue,
            };
            *inner.at_mut(s, e) += distance;
            *inner.at_mut(e, s) += distance;
        }

        Ok(Self { inner })
    }

    /// Rebuilds a matrix from its unrolled form by direct assignment, so that
    /// `from_unrolled(m.unroll())` reproduces `m`.
    ///
    /// Each ordered pair may appear at most once, self pairs are rejected, and
    /// `(i, j)` must carry the same distance as `(j, i)`.
    pub fn from_unrolled(rows: &[DistanceRow]) -> Result<Self> {
        let ids = universe(rows);
        let mut inner = LabeledMatrix::zeros(ids.iter().copied(), ids.iter().copied());
        let mut seen = BTreeSet::new();

        for (i, row) in rows.iter().enumerate() {
            let distance = ensure_number("distance", i, row.distance)?;
            if row.id_start == row.id_end {
                return Err(AnalyticsError::validation(format!(
                    "row {} pairs identifier {} with itself",
                    i, row.id_start
                )));
            }
            if !seen.insert((row.id_start, row.id_end)) {
                return Err(AnalyticsError::validation(format!(
                    "row {} repeats pair ({}, {})",
                    i, row.id_start, row.id_end
                )));
            }
            let start = inner.row_index(row.id_start);
            let end = inner.row_index(row.id_end);
            if let (Some(s), Some(e)) = (start, end) {
                *inner.at_mut(s, e) = distance;
            }
        }

        let matrix = Self { inner };
        if let Some((i, j)) = matrix.first_asymmetric_pair() {
            return Err(AnalyticsError::validation(format!(
                "distance ({}, {}) = {} differs from ({}, {}) = {}",
                i,
                j,
                matrix.get(i, j).unwrap_or_default(),
                j,
                i,
                matrix.get(j, i).unwrap_or_default()
            )));
        }
        Ok(matrix)
    }

    /// Sorted identifier universe.
    pub fn ids(&self) -> &[NodeId] {
        self.inner.row_ids()
    }

    pub fn size(&self) -> usize {
        self.inner.row_ids().len()
    }

    /// Distance between two identifiers, `None` if either is unknown.
    pub fn get(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.inner.get(from, to)
    }

    pub fn as_matrix(&self) -> &LabeledMatrix {
        &self.inner
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.size();
        (0..n).all(|i| {
            ((i + 1)..n).all(|j| (self.inner.at(i, j) - self.inner.at(j, i)).abs() <= tol)
        })
    }

    fn first_asymmetric_pair(&self) -> Option<(NodeId, NodeId)> {
        let ids = self.ids();
        (0..ids.len())
            .flat_map(|i| ((i + 1)..ids.len()).map(move |j| (i, j)))
            .find(|&(i, j)| self.inner.at(i, j) != self.inner.at(j, i))
            .map(|(i, j)| (ids[i], ids[j]))
    }

    /// One row per ordered pair of distinct identifiers, `n * (n - 1)` rows in
    /// total, ordered by start then end.
    pub fn unroll(&self) -> Vec<DistanceRow> {
        let ids = self.ids();
        let mut out = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1));
        for (i, &start) in ids.iter().enumerate() {
            for (j, &end) in ids.iter().enumerate() {
                if i != j {
                    out.push(DistanceRow::new(start, end, self.inner.at(i, j)));
                }
            }
        }
        out
    }
}

/// Computes the symmetric, accumulated distance matrix for a set of segments.
pub fn calculate_distance_matrix(rows: &[DistanceRow]) -> Result<DistanceMatrix> {
    DistanceMatrix::from_rows(rows)
}

/// Unrolls a distance matrix into `(id_start, id_end, distance)` rows.
pub fn unroll_distance_matrix(matrix: &DistanceMatrix) -> Vec<DistanceRow> {
    matrix.unroll()
}

/// Unrolls a sparse directed pair table without building a matrix.
///
/// Every ordered pair of distinct identifiers is emitted once. A pair takes
/// its distance from the matching `(id_start, id_end)` row, summed if the
/// pair repeats, and 0 if it is absent. The reverse direction is not implied.
pub fn unroll_pairs(rows: &[DistanceRow]) -> Result<Vec<DistanceRow>> {
    let mut index: HashMap<(NodeId, NodeId), f64> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let distance = ensure_number("distance", i, row.distance)?;
        *index.entry((row.id_start, row.id_end)).or_default() += distance;
    }

    let ids = universe(rows);
    let mut out = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1));
    for &start in &ids {
        for &end in &ids {
            if start != end {
                let distance = index.get(&(start, end)).copied().unwrap_or(0.0);
                out.push(DistanceRow::new(start, end, distance));
            }
        }
    }
    Ok(out)
}

/// Finds every `id_start` having at least one row whose distance lies within
/// 10% of the reference identifier's average distance.
///
/// The average is taken over the reference's own rows; the comparison is made
/// against individual rows across the whole table. Result is sorted and
/// de-duplicated.
pub fn find_ids_within_ten_percentage_threshold(
    rows: &[DistanceRow],
    reference_id: NodeId,
) -> Result<Vec<NodeId>> {
    let distances = rows
        .iter()
        .enumerate()
        .map(|(i, r)| ensure_number("distance", i, r.distance))
        .collect::<Result<Vec<f64>>>()?;

    let reference: Vec<f64> = rows
        .iter()
        .zip(&distances)
        .filter(|(r, _)| r.id_start == reference_id)
        .map(|(_, d)| *d)
        .collect();

    if reference.is_empty() {
        return Err(AnalyticsError::Lookup(reference_id));
    }

    let average = mean(&reference);
    let lower = average - THRESHOLD_PERCENT * average;
    let upper = average + THRESHOLD_PERCENT * average;
    debug!(reference_id, average, lower, upper, "Threshold window");

    let ids: BTreeSet<NodeId> = rows
        .iter()
        .zip(&distances)
        .filter(|(_, d)| **d >= lower && **d <= upper)
        .map(|(r, _)| r.id_start)
        .collect();

    Ok(ids.into_iter().collect())
}

fn universe(rows: &[DistanceRow]) -> Vec<NodeId> {
    sorted_unique(rows.iter().flat_map(|r| [r.id_start, r.id_end]))
}
