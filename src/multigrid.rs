//! Three-level geometric multigrid V-cycle over nested cube/sphere meshes
//!
//! Grounded on `original_source/lib/src/utils/MultiGrid.cpp`: restriction by
//! injection through the duplicated-vertex grid, bilinear prolongation on
//! the per-face parameter grid, damped Jacobi smoothing, and a V-cycle that
//! solves the coarsest level by conjugate gradient.

use crate::error::{FemError, FemResult};
use crate::krylov::{self, CgScratch, SolveOutcome};
use crate::matrix::{DiagMatrix, Matrix};
use crate::mesh::{Mesh, MeshTopology};
use crate::vecmath::{self, Vec};

/// One level of the hierarchy: a mesh, its assembled operator, and scratch
pub struct MultiGridLevel {
    pub mesh: Mesh,
    pub matrix: crate::matrix::CsrMatrix,
    pub residual: Vec,
}

impl MultiGridLevel {
    fn new(subdiv: usize, topology: MeshTopology, builder: &dyn Fn(&Mesh) -> crate::matrix::CsrMatrix) -> FemResult<MultiGridLevel> {
        let mesh = Mesh::generate(subdiv, topology, true)?;
        let matrix = builder(&mesh);
        let n = mesh.vertex_count();
        Ok(MultiGridLevel {
            mesh,
            matrix,
            residual: vecmath::zeros(n),
        })
    }

    fn dup_n(&self) -> usize {
        self.mesh.subdiv + 1
    }
}

/// The four-level hierarchy (finest + three coarsenings by a factor of two)
pub struct MultiGridHierarchy {
    pub levels: [MultiGridLevel; 4],
    pub d0: DiagMatrix,
}

impl MultiGridHierarchy {
    /// Build the hierarchy from the finest subdivision. `subdiv0` must be a
    /// multiple of 8 so `subdiv0/2`, `subdiv0/4`, `subdiv0/8` are all
    /// integers.
    pub fn build(
        subdiv0: usize,
        topology: MeshTopology,
        builder: impl Fn(&Mesh) -> crate::matrix::CsrMatrix,
    ) -> FemResult<MultiGridHierarchy> {
        if !subdiv0.is_multiple_of(8) || subdiv0 == 0 {
            return Err(FemError::NonUniformHierarchy(subdiv0));
        }
        let level0 = MultiGridLevel::new(subdiv0, topology, &builder)?;
        let level1 = MultiGridLevel::new(subdiv0 / 2, topology, &builder)?;
        let level2 = MultiGridLevel::new(subdiv0 / 4, topology, &builder)?;
        let level3 = MultiGridLevel::new(subdiv0 / 8, topology, &builder)?;

        let d0 = DiagMatrix::from_csr_diagonal(&level0.matrix);

        Ok(MultiGridHierarchy {
            levels: [level0, level1, level2, level3],
            d0,
        })
    }

    /// Restrict a fine-level field to the coarser level directly beneath it
    /// by injection: every coarse vertex coincides with a fine one.
    pub fn project_to_coarse(&self, fine: &Vec, coarse_level: usize) -> Vec {
        let f = &self.levels[coarse_level - 1];
        let c = &self.levels[coarse_level];
        let step = f.mesh.subdiv / c.mesh.subdiv;
        let n_fine = f.dup_n();
        let n_coarse = c.dup_n();
        let dup_fine = f.mesh.dup_to_unique.as_ref().unwrap();
        let dup_coarse = c.mesh.dup_to_unique.as_ref().unwrap();

        let mut out = vecmath::zeros(c.mesh.vertex_count());
        for face in 0..6 {
            for i in 0..n_coarse {
                for j in 0..n_coarse {
                    let coarse_dup = face * n_coarse * n_coarse + i * n_coarse + j;
                    let fine_dup = face * n_fine * n_fine + (i * step) * n_fine + (j * step);
                    out[dup_coarse[coarse_dup] as usize] = fine[dup_fine[fine_dup] as usize];
                }
            }
        }
        out
    }

    /// Prolongate a coarse-level field to the finer level directly above it
    /// via per-face bilinear interpolation.
    pub fn project_to_fine(&self, coarse: &Vec, fine_level: usize) -> Vec {
        let f = &self.levels[fine_level];
        let c = &self.levels[fine_level + 1];
        let step = f.mesh.subdiv / c.mesh.subdiv;
        let n_fine = f.dup_n();
        let n_coarse = c.dup_n();
        let dup_fine = f.mesh.dup_to_unique.as_ref().unwrap();
        let dup_coarse = c.mesh.dup_to_unique.as_ref().unwrap();

        let mut out = vecmath::zeros(f.mesh.vertex_count());
        for face in 0..6 {
            for rf in 0..n_fine {
                for cf in 0..n_fine {
                    let rc_f = rf as f64 / step as f64;
                    let cc_f = cf as f64 / step as f64;
                    let rc0 = (rc_f.floor() as usize).min(n_coarse - 1);
                    let cc0 = (cc_f.floor() as usize).min(n_coarse - 1);
                    let rc1 = (rc0 + 1).min(n_coarse - 1);
                    let cc1 = (cc0 + 1).min(n_coarse - 1);
                    let dy = rc_f - rc0 as f64;
                    let dx = cc_f - cc0 as f64;

                    let get_coarse = |r: usize, c_: usize| -> f64 {
                        let idx = face * n_coarse * n_coarse + r * n_coarse + c_;
                        coarse[dup_coarse[idx] as usize]
                    };
                    let v00 = get_coarse(rc0, cc0);
                    let v01 = get_coarse(rc0, cc1);
                    let v10 = get_coarse(rc1, cc0);
                    let v11 = get_coarse(rc1, cc1);

                    let top = v00 * (1.0 - dx) + v01 * dx;
                    let bot = v10 * (1.0 - dx) + v11 * dx;
                    let value = top * (1.0 - dy) + bot * dy;

                    let fine_dup = face * n_fine * n_fine + rf * n_fine + cf;
                    out[dup_fine[fine_dup] as usize] = value;
                }
            }
        }
        out
    }

    /// `x ← x + ω·D⁻¹·(b − A·x)`, repeated `iters` times
    pub fn damped_jacobi(
        &self,
        a: &dyn Matrix,
        d: &DiagMatrix,
        b: &Vec,
        x: &mut Vec,
        omega: f64,
        iters: usize,
    ) -> FemResult<()> {
        let n = x.len();
        let mut ax = vecmath::zeros(n);
        let mut residual = vecmath::zeros(n);
        let mut correction = vecmath::zeros(n);
        for _ in 0..iters {
            a.apply(x, &mut ax)?;
            for i in 0..n {
                residual[i] = b[i] - ax[i];
            }
            d.apply_inverse(&residual, &mut correction)?;
            vecmath::blas_axpy(omega, &correction, x);
        }
        Ok(())
    }

    /// Subtract the arithmetic mean from every entry of `x`
    pub fn zero_mean_project(x: &mut Vec) {
        let mean = vecmath::sum(x) / x.len() as f64;
        for v in x.iter_mut() {
            *v -= mean;
        }
    }

    /// V-cycle solve of `A0 x = b` to relative-residual tolerance `tol`
    pub fn solve(
        &mut self,
        b: &Vec,
        x: &mut Vec,
        tol: f64,
        iter_max: usize,
        omega: f64,
        smoother_iters: usize,
        coarse_tol: f64,
        coarse_iter_max: usize,
    ) -> FemResult<SolveOutcome> {
        let n0 = self.levels[0].mesh.vertex_count();
        let b_norm = vecmath::norm(b).max(1e-300);

        let mut iters = 0;
        let mut rel = f64::INFINITY;

        while iters < iter_max {
            self.damped_jacobi(&self.levels[0].matrix, &self.d0, b, x, omega, smoother_iters)?;

            let mut ax = vecmath::zeros(n0);
            self.levels[0].matrix.apply(x, &mut ax)?;
            for i in 0..n0 {
                self.levels[0].residual[i] = b[i] - ax[i];
            }
            let r0 = self.levels[0].residual.clone();
            rel = vecmath::norm(&r0) / b_norm;
            iters += 1;
            log::debug!("multigrid v-cycle {iters}: rel = {rel}");
            if rel <= tol {
                break;
            }

            let r1 = self.project_to_coarse(&r0, 1);
            let r2 = self.project_to_coarse(&r1, 2);
            let mut r3 = self.project_to_coarse(&r2, 3);
            Self::zero_mean_project(&mut r3);

            let n3 = self.levels[3].mesh.vertex_count();
            let mut e3 = vecmath::zeros(n3);
            let mut cg_scratch = CgScratch::new(n3);
            krylov::conjugate_gradient(
                &self.levels[3].matrix,
                &r3,
                &mut e3,
                &mut cg_scratch,
                coarse_tol,
                coarse_iter_max,
            )?;

            let e2 = self.project_to_fine(&e3, 2);
            let e1 = self.project_to_fine(&e2, 1);
            let mut correction = self.project_to_fine(&e1, 0);
            Self::zero_mean_project(&mut correction);

            vecmath::blas_axpy(1.0, &correction, x);

            self.damped_jacobi(&self.levels[0].matrix, &self.d0, b, x, omega, smoother_iters)?;
        }

        Ok(SolveOutcome {
            converged: rel <= tol,
            iterations: iters,
            rel_error: rel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::build_stiffness_matrix_csr;

    #[test]
    fn hierarchy_rejects_non_multiple_of_eight() {
        let result = MultiGridHierarchy::build(5, MeshTopology::Sphere, build_stiffness_matrix_csr);
        assert!(matches!(result, Err(FemError::NonUniformHierarchy(5))));
    }

    #[test]
    fn restriction_then_prolongation_reproduces_constants() {
        let hier = MultiGridHierarchy::build(8, MeshTopology::Sphere, build_stiffness_matrix_csr).unwrap();
        let ones = Vec::from_element(hier.levels[0].mesh.vertex_count(), 3.0);
        let r1 = hier.project_to_coarse(&ones, 1);
        let back = hier.project_to_fine(&r1, 0);
        for i in 0..ones.len() {
            assert!((back[i] - 3.0).abs() < 1e-10);
        }
    }

    #[test]
    fn v_cycle_reduces_residual_on_zero_mean_stiffness_rhs() {
        // The V-cycle's coarsest-level solve always zero-means the residual
        // (matching the original implementation), so it only converges for a
        // right-hand side compatible with the stiffness matrix's constant
        // null space.
        let mut hier =
            MultiGridHierarchy::build(8, MeshTopology::Sphere, build_stiffness_matrix_csr).unwrap();

        let n = hier.levels[0].mesh.vertex_count();
        let mut b = vecmath::zeros(n);
        for i in 0..n {
            b[i] = ((i * 7) % 11) as f64 - 5.0;
        }
        MultiGridHierarchy::zero_mean_project(&mut b);
        let mut x = vecmath::zeros(n);
        let outcome = hier
            .solve(&b, &mut x, 1e-6, 30, 0.6, 5, 1e-10, 500)
            .unwrap();
        assert!(outcome.converged || outcome.rel_error < 0.2);
    }
}
