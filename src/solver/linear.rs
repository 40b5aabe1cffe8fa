//! Dense matrix storage and the direct linear solve used by Newton.

use crate::error::{Result, SimError};

/// Dense square matrix (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    a: Vec<f64>,
    size: usize,
}

impl DenseMatrix {
    /// Create a zero matrix of the given dimension.
    pub fn zeros(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            size,
        }
    }

    /// Create an identity matrix of the given dimension.
    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size);
        for i in 0..size {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build a matrix from rows. All rows must have `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let size = rows.len();
        let mut m = Self::zeros(size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(SimError::DimensionMismatch {
                    rows: size,
                    len: row.len(),
                });
            }
            m.a[i * size..(i + 1) * size].copy_from_slice(row);
        }
        Ok(m)
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] = value;
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.size {
            return Err(SimError::DimensionMismatch {
                rows: self.size,
                len: x.len(),
            });
        }
        Ok((0..self.size)
            .map(|i| (0..self.size).map(|j| self.get(i, j) * x[j]).sum())
            .collect())
    }
}

/// Solve `A x = b` by Gaussian elimination without pivoting.
///
/// The matrix and right-hand side are consumed and overwritten during
/// elimination. Pivots are used as they stand: a zero pivot divides by zero
/// and the returned solution contains non-finite values.
pub fn solve(mut matrix: DenseMatrix, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = matrix.size;
    if b.len() != n {
        return Err(SimError::DimensionMismatch { rows: n, len: b.len() });
    }

    // Forward elimination
    for k in 0..n.saturating_sub(1) {
        let pivot = matrix.get(k, k);
        for i in (k + 1)..n {
            let factor = matrix.get(i, k) / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                let v = matrix.get(k, j);
                matrix.add(i, j, -factor * v);
            }
            b[i] -= factor * b[k];
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += matrix.get(i, j) * x[j];
        }
        x[i] = (b[i] - sum) / matrix.get(i, i);
    }

    Ok(x)
}
