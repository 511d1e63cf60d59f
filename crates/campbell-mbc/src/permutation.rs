//! Index permutations for reordering state-space matrices.

use nalgebra::DMatrix;

/// A reordering of `0..n`.
///
/// Position `i` of the reordered layout holds original index `order[i]`.
/// As a matrix, `P[(i, order[i])] = 1`, so `P * x` gathers `x` into the new
/// layout and `P^T * y` scatters it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    order: Vec<usize>,
}

impl Permutation {
    /// Identity permutation of length `n`.
    pub fn identity(n: usize) -> Self {
        Self {
            order: (0..n).collect(),
        }
    }

    /// Build from an explicit order, returning `None` unless it is a
    /// bijection on `0..order.len()`.
    pub fn from_order(order: Vec<usize>) -> Option<Self> {
        let mut seen = vec![false; order.len()];
        for &i in &order {
            if i >= order.len() || std::mem::replace(&mut seen[i], true) {
                return None;
            }
        }
        Some(Self { order })
    }

    /// Concatenate permutations of consecutive index blocks.
    ///
    /// Each part's indices are shifted by the total length of the parts
    /// before it.
    pub fn concat(parts: &[&Permutation]) -> Self {
        let mut order = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
        let mut offset = 0;
        for part in parts {
            order.extend(part.order.iter().map(|&i| i + offset));
            offset += part.len();
        }
        Self { order }
    }

    /// Concatenate a block with a copy of itself shifted by its own length.
    pub fn doubled(&self) -> Self {
        Self::concat(&[self, self])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Original index at each new position.
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Dense permutation matrix `P`.
    pub fn matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut p = DMatrix::zeros(n, n);
        for (i, &j) in self.order.iter().enumerate() {
            p[(i, j)] = 1.0;
        }
        p
    }
}

/// Reorder rows and columns: returns `P_rows * m * P_cols^T`.
pub fn permute(m: &DMatrix<f64>, rows: &Permutation, cols: &Permutation) -> DMatrix<f64> {
    debug_assert_eq!(m.shape(), (rows.len(), cols.len()));
    DMatrix::from_fn(rows.len(), cols.len(), |i, j| {
        m[(rows.order[i], cols.order[j])]
    })
}

/// Undo [`permute`]: returns `P_rows^T * m * P_cols`.
pub fn unpermute(m: &DMatrix<f64>, rows: &Permutation, cols: &Permutation) -> DMatrix<f64> {
    debug_assert_eq!(m.shape(), (rows.len(), cols.len()));
    let mut out = DMatrix::zeros(rows.len(), cols.len());
    for (i, &r) in rows.order.iter().enumerate() {
        for (j, &c) in cols.order.iter().enumerate() {
            out[(r, c)] = m[(i, j)];
        }
    }
    out
}
