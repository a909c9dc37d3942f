//! Sparse Cholesky factorization over skyline storage
//!
//! Symbolic/numeric split and the triangular solves are grounded on
//! `original_source/lib/src/linalg/cholesky.cpp`; the skyline profile and
//! column-outer-product shape also mirror `fea-solver`'s
//! `SparseCholeskySolver` in `src/math/sparse.rs`.

use rayon::prelude::*;

use crate::error::{FemError, FemResult};
use crate::matrix::{CsrMatrix, SkylineMatrix};
use crate::vecmath::Vec;

/// Symbolic + numeric Cholesky factor of a symmetric positive-definite
/// matrix, stored in skyline format.
pub struct CholeskyState {
    l: SkylineMatrix,
    factored: bool,
}

impl CholeskyState {
    /// Symbolic phase: derive the skyline profile from `a`'s connectivity,
    /// copy its values in, and optionally add `eps` to every diagonal entry
    /// (the mitigation for a matrix that is only positive semi-definite,
    /// such as the surface stiffness matrix with its constant null space).
    pub fn attach(a: &CsrMatrix, eps: f64) -> CholeskyState {
        let mut l = SkylineMatrix::from_csr(a);
        if eps != 0.0 {
            for i in 0..l.rows {
                let v = l.get(i, i);
                l.set(i, i, v + eps);
            }
        }
        CholeskyState { l, factored: false }
    }

    /// Numeric phase: column-by-column outer-product factorization,
    /// `a = l * l^T`, overwriting the skyline buffer in place.
    pub fn compute(&mut self) -> FemResult<()> {
        let rows = self.l.rows;
        if rows == 0 {
            self.factored = true;
            return Ok(());
        }

        let a00 = self.l.get(0, 0);
        if a00 < 0.0 {
            return Err(FemError::NotPositiveDefinite { row: 0 });
        }
        let l00 = a00.sqrt();
        self.l.set(0, 0, l00);
        for r in 1..rows {
            if self.l.row_start[r] == 0 {
                let v = self.l.get(r, 0) / l00;
                self.l.set(r, 0, v);
            }
        }

        for col in 1..rows {
            let cm = self.l.row_start[col];
            let mut sum = 0.0;
            for i in cm..col {
                let v = self.l.get(col, i);
                sum += v * v;
            }
            let diag_sq = self.l.get(col, col) - sum;
            if diag_sq < 0.0 {
                return Err(FemError::NotPositiveDefinite { row: col });
            }
            let diag = diag_sq.sqrt();
            self.l.set(col, col, diag);

            let row_start = &self.l.row_start;
            let row_offset = &self.l.row_offset;
            let updates: std::vec::Vec<(usize, f64)> = (col + 1..rows)
                .into_par_iter()
                .filter_map(|k| {
                    let km = row_start[k];
                    if km > col {
                        return None;
                    }
                    let lo = cm.max(km);
                    let mut acc = 0.0;
                    for i in lo..col {
                        let start_k = row_offset[k] + (i - km);
                        let start_c = row_offset[col] + (i - cm);
                        acc += self.l.elements[start_k] * self.l.elements[start_c];
                    }
                    let a_kc = self.l.get(k, col);
                    Some((k, (a_kc - acc) / diag))
                })
                .collect();
            for (k, value) in updates {
                self.l.set(k, col, value);
            }
        }

        self.factored = true;
        Ok(())
    }

    /// Read a single entry of the computed factor `L`, `(i, j)` with `i >= j`.
    pub fn factor_value(&self, i: usize, j: usize) -> f64 {
        self.l.get(i, j)
    }

    /// Solve `L L^T x = b` via forward then backward substitution.
    pub fn solve(&self, b: &Vec, x: &mut Vec) -> FemResult<()> {
        if !self.factored {
            return Err(FemError::NotFactored);
        }
        let rows = self.l.rows;
        x.copy_from(b);

        for r in 0..rows {
            let start = self.l.row_start[r];
            let mut sum = 0.0;
            for k in start..r {
                sum += self.l.get(r, k) * x[k];
            }
            x[r] = (x[r] - sum) / self.l.get(r, r);
        }

        for r in (0..rows).rev() {
            x[r] /= self.l.get(r, r);
            let start = self.l.row_start[r];
            for k in start..r {
                let v = self.l.get(r, k) * x[r];
                x[k] -= v;
            }
        }
        Ok(())
    }
}
