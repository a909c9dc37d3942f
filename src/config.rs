//! Solver configuration
//!
//! Grounded on `fea-solver/src/analysis/mod.rs`'s `AnalysisOptions`: a
//! small, serde-derivable options struct with named constructors for the
//! common solver setups instead of free-floating numeric literals at call
//! sites.

use serde::{Deserialize, Serialize};

/// Tunables shared across the Krylov solvers, the multigrid smoother, and
/// the Cholesky factorization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub tol: f64,
    pub iter_max: usize,
    /// Multigrid Jacobi relaxation factor
    pub damping: f64,
    /// Jacobi smoother passes per V-cycle visit to the finest level
    pub smoother_iters: usize,
    /// Diagonal shift added at Cholesky `attach` time
    pub cholesky_shift: f64,
}

impl Default for SolverOptions {
    fn default() -> SolverOptions {
        SolverOptions {
            tol: 1e-8,
            iter_max: 1000,
            damping: 0.6,
            smoother_iters: 5,
            cholesky_shift: 1e-10,
        }
    }
}

impl SolverOptions {
    /// Tight tolerance, no smoothing/shift needed: a single elliptic solve
    pub fn helmholtz() -> SolverOptions {
        SolverOptions {
            tol: 1e-10,
            iter_max: 2000,
            ..SolverOptions::default()
        }
    }

    /// Looser per-step tolerance appropriate for a time-stepping loop
    pub fn navier_stokes() -> SolverOptions {
        SolverOptions {
            tol: 1e-7,
            iter_max: 500,
            cholesky_shift: 1e-8,
            ..SolverOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_override_only_their_named_fields() {
        let helmholtz = SolverOptions::helmholtz();
        assert_eq!(helmholtz.damping, SolverOptions::default().damping);
        assert_eq!(helmholtz.tol, 1e-10);

        let ns = SolverOptions::navier_stokes();
        assert_eq!(ns.smoother_iters, SolverOptions::default().smoother_iters);
        assert_eq!(ns.cholesky_shift, 1e-8);
    }
}
