//! Dense linear solves by Gauss-Jordan elimination.
//!
//! Systems are stored as a `rows x (rows + 1)` row-major augmented buffer with
//! the right-hand side in the last column. Each elimination step uses the
//! largest remaining coefficient anywhere in the unprocessed rows as pivot
//! (full pivoting). Columns are never physically swapped: the row that ends up
//! owning each column's pivot is recorded and the rows are permuted back into
//! column order once elimination finishes.

use crate::util::error::try_zeroed;
use crate::util::{PixelShiftError, PixelShiftResult};

/// Pivots with a magnitude below this are treated as zero.
pub const SINGULAR_EPS: f64 = 1e-10;

/// Augmented system `A * p = b` owned for the duration of one solve.
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentedMatrix {
    data: Vec<f64>,
    rows: usize,
}

impl AugmentedMatrix {
    /// Allocates a zeroed `rows x (rows + 1)` system.
    pub fn zeros(rows: usize) -> PixelShiftResult<Self> {
        let len = augmented_len(rows)?;
        let data = try_zeroed(len, "augmented matrix")?;
        Ok(Self { data, rows })
    }

    /// Wraps an existing row-major augmented buffer.
    pub fn from_vec(data: Vec<f64>, rows: usize) -> PixelShiftResult<Self> {
        let expected = augmented_len(rows)?;
        if data.len() != expected {
            return Err(PixelShiftError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, rows })
    }

    /// Number of equations (and unknowns).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of stored columns, including the right-hand side.
    pub fn cols(&self) -> usize {
        self.rows + 1
    }

    /// Returns the coefficient at `(row, col)`; `col == rows` is the RHS.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col > self.rows {
            return None;
        }
        self.data.get(row * self.cols() + col).copied()
    }

    /// Adds `value` to the entry at `(row, col)`.
    #[inline]
    pub(crate) fn accumulate(&mut self, row: usize, col: usize, value: f64) {
        let cols = self.cols();
        self.data[row * cols + col] += value;
    }

    /// Returns the raw buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Reduces the system in place and returns the solution column.
    pub fn solve(mut self) -> PixelShiftResult<Vec<f64>> {
        solve_linear_system(&mut self.data, self.rows)?;
        let cols = self.cols();
        Ok((0..self.rows).map(|i| self.data[i * cols + self.rows]).collect())
    }
}

fn augmented_len(rows: usize) -> PixelShiftResult<usize> {
    if rows == 0 {
        return Err(PixelShiftError::InvalidInput("system must have at least one row"));
    }
    rows.checked_add(1)
        .and_then(|cols| cols.checked_mul(rows))
        .ok_or(PixelShiftError::InvalidInput("system too large"))
}

/// Reduces a `rows x (rows + 1)` augmented buffer to reduced row-echelon form.
///
/// On success the left block is the identity and the last column holds the
/// solution. The pivot search uses `>=`, so among equal magnitudes the last
/// cell scanned (bottom-most row, right-most column) wins.
///
/// Returns [`PixelShiftError::SingularMatrix`] if any pivot magnitude falls
/// below [`SINGULAR_EPS`]; the buffer contents are unspecified afterwards.
pub fn solve_linear_system(matrix: &mut [f64], rows: usize) -> PixelShiftResult<()> {
    let expected = augmented_len(rows)?;
    if matrix.len() != expected {
        return Err(PixelShiftError::BufferSizeMismatch {
            expected,
            got: matrix.len(),
        });
    }
    let cols = rows + 1;

    // pivot_row[col] is the row whose pivot sits in `col`.
    let mut pivot_row: Vec<usize> = Vec::new();
    pivot_row
        .try_reserve_exact(rows)
        .map_err(|_| PixelShiftError::AllocationFailure {
            context: "pivot index",
            len: rows,
        })?;
    pivot_row.resize(rows, 0);

    for step in 0..rows {
        let (prow, pcol) = find_pivot(matrix, rows, step);

        if prow != step {
            swap_rows(matrix, cols, step, prow);
        }
        pivot_row[pcol] = step;

        let pivot = matrix[step * cols + pcol];
        if pivot.is_nan() || pivot.abs() < SINGULAR_EPS {
            return Err(PixelShiftError::SingularMatrix { step });
        }

        for c in 0..cols {
            if c != pcol {
                matrix[step * cols + c] /= pivot;
            }
        }
        matrix[step * cols + pcol] = 1.0;

        for r in 0..rows {
            if r == step {
                continue;
            }
            let factor = matrix[r * cols + pcol];
            if factor != 0.0 {
                for c in 0..cols {
                    if c != pcol {
                        matrix[r * cols + c] -= factor * matrix[step * cols + c];
                    }
                }
            }
            matrix[r * cols + pcol] = 0.0;
        }
    }

    // Bring each column's pivot row to the diagonal.
    for col in 0..rows {
        let row = pivot_row[col];
        if row == col {
            continue;
        }
        swap_rows(matrix, cols, col, row);
        if let Some(other) = pivot_row[col + 1..].iter().position(|&r| r == col) {
            pivot_row[col + 1 + other] = row;
        }
        pivot_row[col] = col;
    }

    Ok(())
}

/// Largest-magnitude cell among rows `step..rows`, scanned row-major.
///
/// Ties go to the cell scanned last.
fn find_pivot(matrix: &[f64], rows: usize, step: usize) -> (usize, usize) {
    let cols = rows + 1;
    let mut prow = step;
    let mut pcol = step;
    let mut pval = -1.0f64;
    for r in step..rows {
        for c in 0..rows {
            let mag = matrix[r * cols + c].abs();
            if mag >= pval {
                pval = mag;
                prow = r;
                pcol = c;
            }
        }
    }
    (prow, pcol)
}

fn swap_rows(matrix: &mut [f64], cols: usize, a: usize, b: usize) {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = matrix.split_at_mut(hi * cols);
    head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
}
