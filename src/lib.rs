//! A P1 finite-element numerical core for elliptic and time-dependent PDEs
//! on closed 2-manifold surface meshes (cube and sphere topologies).
//!
//! Covers mesh generation, sparse matrix assembly (implicit FEM, CSR,
//! skyline, diagonal forms), Krylov solvers, sparse Cholesky factorization,
//! three-level geometric multigrid, and a vorticity-stream-function
//! Navier-Stokes time-stepper.
//!
//! ## Example
//! ```rust
//! use surface_fem::prelude::*;
//!
//! let mesh = Mesh::generate(4, MeshTopology::Sphere, false).unwrap();
//! let stiffness = build_stiffness_matrix_fem(&mesh);
//!
//! let ones = surface_fem::vecmath::Vec::from_element(mesh.vertex_count(), 1.0);
//! let mut y = surface_fem::vecmath::zeros(mesh.vertex_count());
//! stiffness.apply(&ones, &mut y).unwrap();
//! assert!(surface_fem::vecmath::norm(&y) < 1e-8);
//! ```

pub mod assembly;
pub mod cholesky;
pub mod config;
pub mod error;
pub mod krylov;
pub mod matrix;
pub mod mesh;
pub mod multigrid;
pub mod navier_stokes;
pub mod vecmath;

pub mod prelude {
    pub use crate::assembly::{
        build_diag_matrix, build_mass_matrix_csr, build_mass_matrix_fem, build_stiffness_matrix_csr,
        build_stiffness_matrix_fem,
    };
    pub use crate::cholesky::CholeskyState;
    pub use crate::config::SolverOptions;
    pub use crate::error::{FemError, FemResult};
    pub use crate::krylov::{conjugate_gradient, steepest_descent, CgScratch, SdScratch, SolveOutcome};
    pub use crate::matrix::{CsrMatrix, DiagMatrix, FemKind, FemMatrix, Matrix, SkylineMatrix};
    pub use crate::mesh::{Mesh, MeshTopology};
    pub use crate::multigrid::MultiGridHierarchy;
    pub use crate::navier_stokes::NavierStokesSolver;
}
