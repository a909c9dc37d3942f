//! P1 local element matrices and global assembly
//!
//! Grounded on `original_source/lib/src/linalg/fem.cpp`'s `buildMassMatrix`/
//! `buildStiffnessMatrix` (both the implicit `FEMatrix` form and the
//! explicit `CSRMatrix` form) and `massLoc`/`stiffLoc`.

use crate::matrix::{CsrMatrix, DiagMatrix, FemKind, FemMatrix};
use crate::mesh::Mesh;
use crate::vecmath::{self, Vec3};

/// Local mass matrix entries for one triangle: `(diag, offdiag)`, where
/// `offdiag` is the single shared off-diagonal of the consistent P1 mass
/// matrix.
fn mass_loc(ab: &Vec3, ac: &Vec3) -> (f64, f64) {
    let area = 0.5 * vecmath::norm3(&vecmath::cross(ab, ac));
    (area / 6.0, area / 12.0)
}

/// Local stiffness matrix entries for one triangle, in the order
/// `(diag_a, diag_b, diag_c, s_ab, s_ac, s_bc)`.
fn stiff_loc(ab: &Vec3, ac: &Vec3) -> (f64, f64, f64, f64, f64, f64) {
    let ab_ab = vecmath::norm2_3(ab);
    let ac_ac = vecmath::norm2_3(ac);
    let ab_ac = vecmath::dot3(ab, ac);
    let m = 0.5 / (ab_ab * ac_ac - ab_ac * ab_ac).sqrt();

    let diag_a = m * (ac_ac + ab_ab - 2.0 * ab_ac);
    let diag_b = m * ac_ac;
    let diag_c = m * ab_ab;
    let s_ab = m * (ab_ac - ac_ac);
    let s_ac = m * (ab_ac - ab_ab);
    let s_bc = -m * ab_ac;

    (diag_a, diag_b, diag_c, s_ab, s_ac, s_bc)
}

fn edges(mesh: &Mesh, a: usize, b: usize, c: usize) -> (Vec3, Vec3) {
    let pa = mesh.vertices[a];
    let pb = mesh.vertices[b];
    let pc = mesh.vertices[c];
    (pb - pa, pc - pa)
}

/// Assemble the P1 mass matrix in implicit `FEMatrix` form.
pub fn build_mass_matrix_fem(mesh: &Mesh) -> FemMatrix<'_> {
    let mut m = FemMatrix::new(mesh, FemKind::Mass);
    for t in 0..mesh.triangle_count() {
        let (a, b, c) = mesh.triangle(t);
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let (ab, ac) = edges(mesh, a, b, c);
        let (diag, offdiag) = mass_loc(&ab, &ac);
        m.diag[a] += diag;
        m.diag[b] += diag;
        m.diag[c] += diag;
        m.offdiag[t] = offdiag;
    }
    m
}

/// Assemble the P1 stiffness matrix in implicit `FEMatrix` form.
pub fn build_stiffness_matrix_fem(mesh: &Mesh) -> FemMatrix<'_> {
    let mut s = FemMatrix::new(mesh, FemKind::Stiffness);
    for t in 0..mesh.triangle_count() {
        let (a, b, c) = mesh.triangle(t);
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let (ab, ac) = edges(mesh, a, b, c);
        let (diag_a, diag_b, diag_c, s_ab, s_ac, s_bc) = stiff_loc(&ab, &ac);
        s.diag[a] += diag_a;
        s.diag[b] += diag_b;
        s.diag[c] += diag_c;
        s.offdiag[3 * t] = s_ab;
        s.offdiag[3 * t + 1] = s_ac;
        s.offdiag[3 * t + 2] = s_bc;
    }
    s
}

/// Locate, in a CSR row, the unique slot whose column is `col`. The row is
/// short (triangle valence is typically ≤ 9 before sorting) so a linear
/// scan over the unsorted structural build is fine; assembly happens before
/// [`CsrMatrix::from_mesh`]'s slot sort, so slots for a single triangle
/// insertion pass are still in arbitrary but stable order.
fn csr_slot(csr: &CsrMatrix, row: usize, col: u32) -> usize {
    let range = csr.row_range(row);
    range.start
        + csr.elm_idx[range.clone()]
            .iter()
            .position(|&c| c == col)
            .expect("csr structural pattern must contain every assembled (row, col) pair")
}

/// Assemble the P1 mass matrix in explicit CSR form.
pub fn build_mass_matrix_csr(mesh: &Mesh) -> CsrMatrix {
    let mut csr = CsrMatrix::from_mesh(mesh);
    for t in 0..mesh.triangle_count() {
        let (a, b, c) = mesh.triangle(t);
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let (ab, ac) = edges(mesh, a, b, c);
        let (diag, offdiag) = mass_loc(&ab, &ac);
        let tri = [a, b, c];
        for &row in &tri {
            for &col in &tri {
                let val = if row == col { diag } else { offdiag };
                let slot = csr_slot(&csr, row, col as u32);
                csr.elements[slot] += val;
            }
        }
    }
    csr
}

/// Assemble the P1 stiffness matrix in explicit CSR form.
pub fn build_stiffness_matrix_csr(mesh: &Mesh) -> CsrMatrix {
    let mut csr = CsrMatrix::from_mesh(mesh);
    for t in 0..mesh.triangle_count() {
        let (a, b, c) = mesh.triangle(t);
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let (ab, ac) = edges(mesh, a, b, c);
        let (diag_a, diag_b, diag_c, s_ab, s_ac, s_bc) = stiff_loc(&ab, &ac);

        let local = [
            (a, a, diag_a),
            (b, b, diag_b),
            (c, c, diag_c),
            (a, b, s_ab),
            (b, a, s_ab),
            (a, c, s_ac),
            (c, a, s_ac),
            (b, c, s_bc),
            (c, b, s_bc),
        ];
        for (row, col, val) in local {
            let slot = csr_slot(&csr, row, col as u32);
            csr.elements[slot] += val;
        }
    }
    csr
}

/// Build a lumped diagonal matrix from a CSR matrix's diagonal.
///
/// Grounded on `original_source/lib/src/linalg/fem.cpp`'s `buildDiagMatrix`.
pub fn build_diag_matrix(csr: &CsrMatrix) -> DiagMatrix {
    DiagMatrix::from_csr_diagonal(csr)
}
