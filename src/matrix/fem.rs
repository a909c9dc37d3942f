//! P1-specific implicit matrix form (`FEMatrix` in the original source)
//!
//! Grounded on `original_source/lib/src/Matrix/FEMatrix.cpp`'s
//! `MVP_P1_Mass`/`MVP_P1_Sniffness` (sic) free functions.

use rayon::prelude::*;

use super::{check_dims, Matrix};
use crate::error::FemResult;
use crate::mesh::Mesh;
use crate::vecmath::Vec;

/// Which P1 bilinear form this matrix was assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FemKind {
    Mass,
    Stiffness,
}

/// P1 mass or stiffness matrix stored in its implicit, triangle-indexed form.
///
/// `diag` has one entry per vertex. `offdiag` has one entry per triangle for
/// [`FemKind::Mass`] (the single shared off-diagonal value of the local 3x3
/// mass matrix), or three entries per triangle (edges AB, AC, BC) for
/// [`FemKind::Stiffness`].
pub struct FemMatrix<'m> {
    pub mesh: &'m Mesh,
    pub kind: FemKind,
    pub diag: Vec,
    pub offdiag: Vec,
}

impl<'m> FemMatrix<'m> {
    pub fn new(mesh: &'m Mesh, kind: FemKind) -> FemMatrix<'m> {
        let offdiag_len = match kind {
            FemKind::Mass => mesh.triangle_count(),
            FemKind::Stiffness => 3 * mesh.triangle_count(),
        };
        FemMatrix {
            mesh,
            kind,
            diag: crate::vecmath::zeros(mesh.vertex_count()),
            offdiag: crate::vecmath::zeros(offdiag_len),
        }
    }

    fn apply_mass(&self, x: &Vec, y: &mut Vec) {
        for i in 0..self.mesh.vertex_count() {
            y[i] = self.diag[i] * x[i];
        }
        for t in 0..self.mesh.triangle_count() {
            let (a, b, c) = self.mesh.triangle(t);
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let v = self.offdiag[t];
            y[a] += v * (x[b] + x[c]);
            y[b] += v * (x[a] + x[c]);
            y[c] += v * (x[a] + x[b]);
        }
    }

    fn apply_stiffness(&self, x: &Vec, y: &mut Vec) {
        for i in 0..self.mesh.vertex_count() {
            y[i] = self.diag[i] * x[i];
        }
        for t in 0..self.mesh.triangle_count() {
            let (a, b, c) = self.mesh.triangle(t);
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let s_ab = self.offdiag[3 * t];
            let s_ac = self.offdiag[3 * t + 1];
            let s_bc = self.offdiag[3 * t + 2];

            y[a] += s_ab * x[b];
            y[b] += s_ab * x[a];
            y[a] += s_ac * x[c];
            y[c] += s_ac * x[a];
            y[b] += s_bc * x[c];
            y[c] += s_bc * x[b];
        }
    }
}

impl<'m> Matrix for FemMatrix<'m> {
    fn rows(&self) -> usize {
        self.mesh.vertex_count()
    }

    fn cols(&self) -> usize {
        self.mesh.vertex_count()
    }

    fn apply(&self, x: &Vec, y: &mut Vec) -> FemResult<()> {
        check_dims("FemMatrix::apply(x)", self.cols(), x.len())?;
        check_dims("FemMatrix::apply(y)", self.rows(), y.len())?;
        y.fill(0.0);
        match self.kind {
            FemKind::Mass => self.apply_mass(x, y),
            FemKind::Stiffness => self.apply_stiffness(x, y),
        }
        Ok(())
    }
}

/// Add the mass contribution `M` into the stiffness matrix `s`'s storage,
/// so a single [`Matrix::apply`] call computes `(S + M) * x`.
///
/// Grounded on `original_source/lib/src/linalg/fem.cpp`'s
/// `addMassToStiffness(FEMatrix&, FEMatrix&)`.
pub fn add_mass_to_stiffness(s: &mut FemMatrix, m: &FemMatrix) {
    debug_assert_eq!(s.kind, FemKind::Stiffness);
    debug_assert_eq!(m.kind, FemKind::Mass);
    s.diag
        .as_mut_slice()
        .par_iter_mut()
        .zip(m.diag.as_slice())
        .for_each(|(sd, md)| *sd += md);
    for t in 0..m.mesh.triangle_count() {
        let v = m.offdiag[t];
        s.offdiag[3 * t] += v;
        s.offdiag[3 * t + 1] += v;
        s.offdiag[3 * t + 2] += v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{build_mass_matrix_fem, build_stiffness_matrix_fem};
    use crate::mesh::MeshTopology;

    #[test]
    fn stiffness_has_constant_null_space() {
        let mesh = Mesh::generate(4, MeshTopology::Sphere, false).unwrap();
        let s = build_stiffness_matrix_fem(&mesh);
        let ones = crate::vecmath::Vec::from_element(mesh.vertex_count(), 1.0);
        let mut y = crate::vecmath::zeros(mesh.vertex_count());
        s.apply(&ones, &mut y).unwrap();
        assert!(crate::vecmath::norm(&y) < 1e-10);
    }

    #[test]
    fn mass_matrix_is_positive_definite_on_random_vector() {
        let mesh = Mesh::generate(3, MeshTopology::Sphere, false).unwrap();
        let m = build_mass_matrix_fem(&mesh);
        let mut x = crate::vecmath::zeros(mesh.vertex_count());
        for i in 0..x.len() {
            x[i] = ((i * 7 + 3) % 11) as f64 - 5.0;
        }
        let mut y = crate::vecmath::zeros(mesh.vertex_count());
        m.apply(&x, &mut y).unwrap();
        assert!(crate::vecmath::dot(&x, &y) > 0.0);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let mesh = Mesh::generate(2, MeshTopology::Cube, false).unwrap();
        let m = build_mass_matrix_fem(&mesh);
        let bad = crate::vecmath::zeros(mesh.vertex_count() + 1);
        let mut y = crate::vecmath::zeros(mesh.vertex_count());
        assert!(m.apply(&bad, &mut y).is_err());
    }
}
