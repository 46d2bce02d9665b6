//! Gauss-Jordan inversion with partial pivoting.

use nalgebra::{DMatrix, DVector};

/// Rows are scaled to unit max-magnitude before elimination; pivots at or
/// below this magnitude are then treated as zero.
pub const RELATIVE_PIVOT_EPS: f64 = 1e-12;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("expected a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("right-hand side has {got} entries, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("singular system: no usable pivot in column {column}")]
    SingularSystem { column: usize },
}

/// Invert a square matrix by Gauss-Jordan elimination.
///
/// For each column the row (at or below the diagonal) with the largest
/// magnitude entry becomes the pivot row and is swapped into place; the pivot
/// row is normalized and the column is eliminated from every other row. The
/// same operations applied to an identity matrix yield the inverse.
///
/// Each row is first divided by its largest magnitude so the pivot test does
/// not depend on how rows are scaled relative to each other. The scaling is
/// folded into the starting right-hand side: `A⁻¹ = (D·A)⁻¹·D`.
pub fn invert(a: &DMatrix<f64>) -> Result<DMatrix<f64>, SolveError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(SolveError::NotSquare {
            rows: n,
            cols: a.ncols(),
        });
    }

    let mut m = a.clone();
    let mut inv = DMatrix::<f64>::identity(n, n);
    for r in 0..n {
        let row_max = m.row(r).iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        // all-zero rows stay as they are and fail at the pivot test
        if row_max > 0.0 {
            m.row_mut(r).scale_mut(1.0 / row_max);
            inv[(r, r)] = 1.0 / row_max;
        }
    }

    for col in 0..n {
        let (pivot_row, pivot_abs) = (col..n)
            .map(|r| (r, m[(r, col)].abs()))
            .fold((col, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if pivot_abs <= RELATIVE_PIVOT_EPS {
            return Err(SolveError::SingularSystem { column: col });
        }
        if pivot_row != col {
            m.swap_rows(pivot_row, col);
            inv.swap_rows(pivot_row, col);
        }

        let pivot = m[(col, col)];
        for j in 0..n {
            m[(col, j)] /= pivot;
            inv[(col, j)] /= pivot;
        }

        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = m[(r, col)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                m[(r, j)] -= factor * m[(col, j)];
                inv[(r, j)] -= factor * inv[(col, j)];
            }
        }
    }

    Ok(inv)
}

/// Solve `a · x = b` as `x = a⁻¹ · b`.
pub fn solve(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    if b.len() != a.nrows() {
        return Err(SolveError::DimensionMismatch {
            expected: a.nrows(),
            got: b.len(),
        });
    }
    let inv = invert(a)?;
    Ok(inv * b)
}
