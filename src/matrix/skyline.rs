//! Skyline (variable-bandwidth, lower-triangular) matrix storage
//!
//! Grounded on `original_source/lib/src/Matrix/SKRMatrix.cpp`: row `i`
//! stores the contiguous run of columns from its leftmost nonzero through
//! the diagonal, which is exactly the profile a symmetric Cholesky
//! factorization fills in without growing past. This is the storage
//! [`crate::cholesky`] factors in place.

use super::{check_dims, CsrMatrix, Matrix};
use crate::error::FemResult;
use crate::vecmath::Vec;

/// A symmetric matrix stored as its lower-triangular skyline profile: row
/// `i` holds columns `row_start[i]..=i`, contiguous in `elements`.
pub struct SkylineMatrix {
    pub rows: usize,
    pub row_start: std::vec::Vec<usize>,
    pub row_offset: std::vec::Vec<usize>,
    pub elements: Vec,
}

impl SkylineMatrix {
    /// Derive the skyline profile and copy values from a CSR matrix's lower
    /// triangle (the matrix is assumed symmetric, as every matrix this
    /// crate builds is).
    pub fn from_csr(csr: &CsrMatrix) -> SkylineMatrix {
        let rows = csr.rows;
        let mut row_start = vec![0usize; rows];
        for i in 0..rows {
            let range = csr.row_range(i);
            let cols = &csr.elm_idx[range];
            let leftmost = cols
                .iter()
                .copied()
                .filter(|&j| (j as usize) <= i)
                .min()
                .unwrap_or(i as u32);
            row_start[i] = leftmost as usize;
        }

        let mut row_offset = vec![0usize; rows + 1];
        for i in 0..rows {
            let width = i - row_start[i] + 1;
            row_offset[i + 1] = row_offset[i] + width;
        }

        let mut elements = crate::vecmath::zeros(row_offset[rows]);
        for i in 0..rows {
            let start = row_offset[i];
            for j in row_start[i]..=i {
                elements[start + (j - row_start[i])] = csr.get(i, j);
            }
        }

        SkylineMatrix {
            rows,
            row_start,
            row_offset,
            elements,
        }
    }

    /// An all-zero skyline matrix with the given profile, used by
    /// [`crate::cholesky`] to hold a factor with the same fill-in pattern
    /// as a source matrix.
    pub fn zeros_with_profile(row_start: std::vec::Vec<usize>) -> SkylineMatrix {
        let rows = row_start.len();
        let mut row_offset = vec![0usize; rows + 1];
        for i in 0..rows {
            let width = i - row_start[i] + 1;
            row_offset[i + 1] = row_offset[i] + width;
        }
        let elements = crate::vecmath::zeros(row_offset[rows]);
        SkylineMatrix {
            rows,
            row_start,
            row_offset,
            elements,
        }
    }

    /// Value at `(i, j)`; both orderings are valid since the matrix is symmetric
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (r, c) = if i >= j { (i, j) } else { (j, i) };
        if c < self.row_start[r] {
            return 0.0;
        }
        self.elements[self.row_offset[r] + (c - self.row_start[r])]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let (r, c) = if i >= j { (i, j) } else { (j, i) };
        debug_assert!(c >= self.row_start[r], "({i},{j}) outside skyline profile");
        let idx = self.row_offset[r] + (c - self.row_start[r]);
        self.elements[idx] = value;
    }
}

impl Matrix for SkylineMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.rows
    }

    fn apply(&self, x: &Vec, y: &mut Vec) -> FemResult<()> {
        check_dims("SkylineMatrix::apply(x)", self.rows, x.len())?;
        check_dims("SkylineMatrix::apply(y)", self.rows, y.len())?;
        y.fill(0.0);
        for i in 0..self.rows {
            let start = self.row_offset[i];
            for j in self.row_start[i]..=i {
                let v = self.elements[start + (j - self.row_start[i])];
                y[i] += v * x[j];
                if j != i {
                    y[j] += v * x[i];
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Mesh, MeshTopology};

    #[test]
    fn skyline_apply_matches_csr_apply() {
        let mesh = Mesh::generate(3, MeshTopology::Sphere, false).unwrap();
        let csr = crate::assembly::build_stiffness_matrix_csr(&mesh);
        let sky = SkylineMatrix::from_csr(&csr);

        let mut x = crate::vecmath::zeros(mesh.vertex_count());
        for i in 0..x.len() {
            x[i] = ((i * 13 + 1) % 7) as f64;
        }

        let mut y_csr = crate::vecmath::zeros(mesh.vertex_count());
        let mut y_sky = crate::vecmath::zeros(mesh.vertex_count());
        csr.apply(&x, &mut y_csr).unwrap();
        sky.apply(&x, &mut y_sky).unwrap();

        for i in 0..x.len() {
            assert!((y_csr[i] - y_sky[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn row_start_never_exceeds_diagonal() {
        let mesh = Mesh::generate(2, MeshTopology::Cube, false).unwrap();
        let csr = crate::assembly::build_mass_matrix_csr(&mesh);
        let sky = SkylineMatrix::from_csr(&csr);
        for i in 0..sky.rows {
            assert!(sky.row_start[i] <= i);
        }
    }
}
