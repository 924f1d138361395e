//! Dense matrix addressed by node identifiers.

use crate::analyzers::types::NodeId;

/// A dense `rows × cols` matrix stored in row-major order, with the sorted
/// identifiers that label each row and column.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    row_ids: Vec<NodeId>,
    col_ids: Vec<NodeId>,
    data: Vec<f64>,
}

impl LabeledMatrix {
    /// Creates a zero matrix. Identifiers are sorted and de-duplicated.
    pub fn zeros(
        row_ids: impl IntoIterator<Item = NodeId>,
        col_ids: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let row_ids = sorted_unique(row_ids);
        let col_ids = sorted_unique(col_ids);
        let data = vec![0.0; row_ids.len() * col_ids.len()];
        Self {
            row_ids,
            col_ids,
            data,
        }
    }

    pub fn row_ids(&self) -> &[NodeId] {
        &self.row_ids
    }

    pub fn col_ids(&self) -> &[NodeId] {
        &self.col_ids
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_ids.len(), self.col_ids.len())
    }

    pub fn row_index(&self, id: NodeId) -> Option<usize> {
        self.row_ids.binary_search(&id).ok()
    }

    pub fn col_index(&self, id: NodeId) -> Option<usize> {
        self.col_ids.binary_search(&id).ok()
    }

    /// Value at `(row, col)` by position.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.col_ids.len() + col]
    }

    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        let cols = self.col_ids.len();
        &mut self.data[row * cols + col]
    }

    /// Value for a pair of identifiers, `None` if either is not in the matrix.
    pub fn get(&self, row_id: NodeId, col_id: NodeId) -> Option<f64> {
        Some(self.at(self.row_index(row_id)?, self.col_index(col_id)?))
    }

    /// One row's values, in column order.
    pub fn row(&self, row: usize) -> &[f64] {
        let cols = self.col_ids.len();
        &self.data[row * cols..(row + 1) * cols]
    }

    /// Returns a new matrix with `f` applied to every cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            row_ids: self.row_ids.clone(),
            col_ids: self.col_ids.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Zeroes every cell whose row and column carry the same identifier.
    pub fn clear_diagonal(&mut self) {
        for r in 0..self.row_ids.len() {
            if let Some(c) = self.col_index(self.row_ids[r]) {
                *self.at_mut(r, c) = 0.0;
            }
        }
    }
}

pub(crate) fn sorted_unique(ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
