//! Vorticity-stream-function Navier-Stokes time-stepper on a closed surface
//!
//! Grounded on `original_source/lib/src/utils/NavierStokesSolver.cpp`.

use crate::assembly::{build_mass_matrix_csr, build_stiffness_matrix_csr};
use crate::cholesky::CholeskyState;
use crate::error::FemResult;
use crate::krylov::{self, CgScratch, SolveOutcome};
use crate::matrix::{CsrMatrix, Matrix};
use crate::mesh::Mesh;
use crate::vecmath::{self, Vec};

/// Time-stepping state for the vorticity-stream-function formulation
pub struct NavierStokesSolver {
    pub mesh: Mesh,
    pub mass: CsrMatrix,
    pub stiffness: CsrMatrix,
    /// `M + ν·Δt·S`, rebuilt whenever `nu` or `dt` changes
    pub combined: CsrMatrix,
    pub omega: Vec,
    pub psi: Vec,
    /// `1ᵀ·M·1`, the total mass, used by the zero-mean projection
    pub vol: f64,
    pub t: f64,
    stream_chol: CholeskyState,
    nu: f64,
    dt: f64,
}

impl NavierStokesSolver {
    pub fn new(mesh: Mesh, nu: f64, dt: f64, cholesky_shift: f64) -> NavierStokesSolver {
        let mass = build_mass_matrix_csr(&mesh);
        let stiffness = build_stiffness_matrix_csr(&mesh);
        let vol = vecmath::sum(&mass.elements);

        let mut stream_chol = CholeskyState::attach(&stiffness, cholesky_shift);
        stream_chol
            .compute()
            .expect("stiffness matrix with diagonal shift must be positive definite");

        let combined = Self::build_combined(&mass, &stiffness, nu, dt);

        let n = mesh.vertex_count();
        NavierStokesSolver {
            mesh,
            mass,
            stiffness,
            combined,
            omega: vecmath::zeros(n),
            psi: vecmath::zeros(n),
            vol,
            t: 0.0,
            stream_chol,
            nu,
            dt,
        }
    }

    fn build_combined(mass: &CsrMatrix, stiffness: &CsrMatrix, nu: f64, dt: f64) -> CsrMatrix {
        let mut combined = stiffness.clone();
        crate::matrix::csr::add_scaled(&mut combined, stiffness, nu * dt, mass);
        combined
    }

    /// Subtract the mass-weighted mean: `x ← x − (1ᵀ·M·x / 1ᵀ·M·1) · 1`
    pub fn zero_mean_project(&self, x: &mut Vec) {
        let mut mx = vecmath::zeros(x.len());
        self.mass.apply(x, &mut mx).expect("mass matrix sized to mesh");
        let s = vecmath::sum(&mx) / self.vol;
        for v in x.iter_mut() {
            *v -= s;
        }
    }

    /// `ψ` solve: `S·ψ = −M·ω`, zero-mean-projected on the right-hand side
    fn compute_stream(&mut self) -> FemResult<()> {
        let n = self.mesh.vertex_count();
        let mut m_omega = vecmath::zeros(n);
        self.mass.apply(&self.omega, &mut m_omega)?;
        for v in m_omega.iter_mut() {
            *v = -*v;
        }
        self.zero_mean_project(&mut m_omega);
        self.stream_chol.solve(&m_omega, &mut self.psi)
    }

    /// Transport term: `T[a] += s·(ψ[b] − ψ[c])` and symmetric variants,
    /// `s = ω[a]+ω[b]+ω[c]`, scaled by `1/6` once assembled.
    fn compute_transport(&self) -> Vec {
        let mut t = vecmath::zeros(self.mesh.vertex_count());
        for tri in 0..self.mesh.triangle_count() {
            let (a, b, c) = self.mesh.triangle(tri);
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let s = self.omega[a] + self.omega[b] + self.omega[c];
            t[a] += s * (self.psi[b] - self.psi[c]);
            t[b] += s * (self.psi[c] - self.psi[a]);
            t[c] += s * (self.psi[a] - self.psi[b]);
        }
        for v in t.iter_mut() {
            *v /= 6.0;
        }
        t
    }

    /// Advance one step of size `dt` with viscosity `nu`, solving the
    /// resulting system by conjugate gradient to `tol`.
    pub fn time_step(&mut self, tol: f64, iter_max: usize) -> FemResult<SolveOutcome> {
        self.compute_stream()?;
        let transport = self.compute_transport();

        let n = self.mesh.vertex_count();
        let mut rhs = vecmath::zeros(n);
        self.mass.apply(&self.omega, &mut rhs)?;
        vecmath::blas_axpy(self.dt, &transport, &mut rhs);

        self.combined = Self::build_combined(&self.mass, &self.stiffness, self.nu, self.dt);

        let mut omega_next = self.omega.clone();
        let mut scratch = CgScratch::new(n);
        let outcome = krylov::conjugate_gradient(
            &self.combined,
            &rhs,
            &mut omega_next,
            &mut scratch,
            tol,
            iter_max,
        )?;
        self.omega = omega_next;
        self.project_omega_zero_mean();

        self.t += self.dt;
        Ok(outcome)
    }

    /// Zero-mean-project `self.omega` in place
    pub fn project_omega_zero_mean(&mut self) {
        let mut omega = std::mem::replace(&mut self.omega, Vec::zeros(0));
        self.zero_mean_project(&mut omega);
        self.omega = omega;
    }
}
