//! Compressed-sparse-row matrix storage and structural construction
//!
//! The structural construction mirrors
//! `original_source/lib/src/Matrix/CSRMatrix.cpp` exactly: each row's slot
//! count is `1 + (number of triangles touching that vertex)`, slots are
//! filled by linear probing while walking triangles a second time, then each
//! row's column indices are sorted ascending.

use rayon::prelude::*;

use super::{check_dims, Matrix};
use crate::error::FemResult;
use crate::mesh::Mesh;

const EMPTY_SLOT: u32 = u32::MAX;

/// A symmetric sparse matrix in compressed-row storage, built from a mesh's
/// vertex-incidence pattern.
#[derive(Clone)]
pub struct CsrMatrix {
    pub rows: usize,
    pub cols: usize,
    pub row_offset: Vec<usize>,
    pub elm_idx: Vec<u32>,
    pub elements: crate::vecmath::Vec,
}

impl CsrMatrix {
    /// Build the sparsity pattern from a mesh's triangle connectivity.
    /// Elements start zeroed; assembly fills them in afterward.
    pub fn from_mesh(mesh: &Mesh) -> CsrMatrix {
        let rows = mesh.vertex_count();

        let mut counts = vec![1usize; rows];
        for t in 0..mesh.triangle_count() {
            let (a, b, c) = mesh.triangle(t);
            counts[a as usize] += 1;
            counts[b as usize] += 1;
            counts[c as usize] += 1;
        }

        let mut row_offset = vec![0usize; rows + 1];
        for r in 0..rows {
            row_offset[r + 1] = row_offset[r] + counts[r];
        }
        let nnz = row_offset[rows];

        let mut elm_idx = vec![EMPTY_SLOT; nnz];

        for t in 0..mesh.triangle_count() {
            let (a, b, c) = mesh.triangle(t);
            let triangle = [a, b, c];
            for &current_row in &triangle {
                let offset = row_offset[current_row as usize];
                let len = row_offset[current_row as usize + 1] - offset;
                for &current_vtx in &triangle {
                    let slots = &mut elm_idx[offset..offset + len];
                    for slot in slots.iter_mut() {
                        if *slot == current_vtx {
                            break;
                        } else if *slot == EMPTY_SLOT {
                            *slot = current_vtx;
                            break;
                        }
                    }
                }
            }
        }

        for r in 0..rows {
            let start = row_offset[r];
            let end = row_offset[r + 1];
            elm_idx[start..end].sort_unstable();
        }

        CsrMatrix {
            rows,
            cols: rows,
            row_offset,
            elm_idx,
            elements: crate::vecmath::zeros(nnz),
        }
    }

    /// The `[start, end)` element-array slice for row `r`
    pub fn row_range(&self, r: usize) -> std::ops::Range<usize> {
        self.row_offset[r]..self.row_offset[r + 1]
    }

    /// Value at `(i, j)`, or `0.0` if the slot isn't stored
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let range = self.row_range(i);
        let cols = &self.elm_idx[range.clone()];
        match cols.binary_search(&(j as u32)) {
            Ok(pos) => self.elements[range.start + pos],
            Err(_) => 0.0,
        }
    }
}

impl Matrix for CsrMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn apply(&self, x: &crate::vecmath::Vec, y: &mut crate::vecmath::Vec) -> FemResult<()> {
        check_dims("CsrMatrix::apply(x)", self.cols, x.len())?;
        check_dims("CsrMatrix::apply(y)", self.rows, y.len())?;

        let elements = self.elements.as_slice();
        let elm_idx = &self.elm_idx;
        let row_offset = &self.row_offset;

        y.as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(r, yr)| {
                let start = row_offset[r];
                let end = row_offset[r + 1];
                let mut acc = 0.0;
                for k in start..end {
                    acc += elements[k] * x[elm_idx[k] as usize];
                }
                *yr = acc;
            });
        Ok(())
    }
}

/// `a.elements <- val * m.elements + s.elements`, element-for-element.
///
/// Requires `a`, `m`, and `s` to share the same sparsity pattern (the usual
/// case: all three assembled from the same mesh). Grounded on
/// `original_source/lib/src/Matrix/CSRMatrix.cpp`'s `blas_addMatrix`.
pub fn add_scaled(a: &mut CsrMatrix, m: &CsrMatrix, val: f64, s: &CsrMatrix) {
    a.elements
        .as_mut_slice()
        .par_iter_mut()
        .zip(m.elements.as_slice())
        .zip(s.elements.as_slice())
        .for_each(|((ae, me), se)| *ae = me * val + se);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshTopology;

    #[test]
    fn row_offset_is_monotone_and_matches_nnz() {
        let mesh = Mesh::generate(3, MeshTopology::Sphere, false).unwrap();
        let csr = CsrMatrix::from_mesh(&mesh);
        assert_eq!(csr.row_offset[0], 0);
        assert_eq!(*csr.row_offset.last().unwrap(), csr.elements.len());
        for w in csr.row_offset.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn each_row_is_sorted_ascending() {
        let mesh = Mesh::generate(3, MeshTopology::Sphere, false).unwrap();
        let csr = CsrMatrix::from_mesh(&mesh);
        for r in 0..csr.rows {
            let range = csr.row_range(r);
            let cols = &csr.elm_idx[range];
            for w in cols.windows(2) {
                assert!(w[0] < w[1]);
            }
        }
    }

    #[test]
    fn every_row_contains_its_own_diagonal_slot() {
        let mesh = Mesh::generate(2, MeshTopology::Cube, false).unwrap();
        let csr = CsrMatrix::from_mesh(&mesh);
        for r in 0..csr.rows {
            let range = csr.row_range(r);
            assert!(csr.elm_idx[range].contains(&(r as u32)));
        }
    }
}
