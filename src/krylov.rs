//! Steepest-descent and conjugate-gradient solvers over the [`Matrix`] trait
//!
//! Grounded on `original_source/lib/src/linalg/systemSolve.cpp`'s
//! `decentGradientSolve` and `conjugateGradientSolve`/`cg_iter_once`.

use crate::error::{FemError, FemResult};
use crate::matrix::Matrix;
use crate::vecmath::{self, Vec};

/// Outcome of a Krylov solve. Non-convergence is reported here, not via
/// `FemResult`'s error channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOutcome {
    pub converged: bool,
    pub iterations: usize,
    pub rel_error: f64,
}

/// Scratch buffers owned by the caller and reused across solves of the same size
pub struct SdScratch {
    pub r: Vec,
    pub ar: Vec,
}

impl SdScratch {
    pub fn new(n: usize) -> SdScratch {
        SdScratch {
            r: vecmath::zeros(n),
            ar: vecmath::zeros(n),
        }
    }
}

/// Scratch buffers for [`conjugate_gradient`]
pub struct CgScratch {
    pub r: Vec,
    pub p: Vec,
    pub ap: Vec,
}

impl CgScratch {
    pub fn new(n: usize) -> CgScratch {
        CgScratch {
            r: vecmath::zeros(n),
            p: vecmath::zeros(n),
            ap: vecmath::zeros(n),
        }
    }
}

/// `u ← u + α·r; r ← r − α·A·r`, repeated until `‖r‖ ≤ tol` or `iter_max` is
/// exhausted.
pub fn steepest_descent(
    a: &dyn Matrix,
    b: &Vec,
    u: &mut Vec,
    scratch: &mut SdScratch,
    tol: f64,
    iter_max: usize,
) -> FemResult<SolveOutcome> {
    a.apply(u, &mut scratch.ar)?;
    for i in 0..u.len() {
        scratch.r[i] = b[i] - scratch.ar[i];
    }

    let mut iters = 0;
    let mut rel_error = vecmath::norm(&scratch.r);
    while rel_error > tol && iters < iter_max {
        a.apply(&scratch.r, &mut scratch.ar)?;
        let r_ar = vecmath::dot(&scratch.r, &scratch.ar);
        if r_ar == 0.0 {
            return Err(FemError::SingularDirection {
                op: "steepest_descent",
            });
        }
        let r2 = vecmath::dot(&scratch.r, &scratch.r);
        let alpha = r2 / r_ar;

        vecmath::blas_axpy(alpha, &scratch.r, u);
        vecmath::blas_axpy(-alpha, &scratch.ar, &mut scratch.r);

        rel_error = vecmath::norm(&scratch.r);
        iters += 1;
        log::debug!("steepest_descent iter {iters}: ‖r‖ = {rel_error}");
    }

    let converged = rel_error <= tol;
    if !converged {
        log::warn!(
            "steepest_descent did not converge after {iters} iterations (‖r‖ = {rel_error}, tol = {tol})"
        );
    }
    Ok(SolveOutcome {
        converged,
        iterations: iters,
        rel_error,
    })
}

/// Conjugate-gradient solve of `A·u = b`.
pub fn conjugate_gradient(
    a: &dyn Matrix,
    b: &Vec,
    u: &mut Vec,
    scratch: &mut CgScratch,
    tol: f64,
    iter_max: usize,
) -> FemResult<SolveOutcome> {
    a.apply(u, &mut scratch.ap)?;
    for i in 0..u.len() {
        scratch.r[i] = b[i] - scratch.ap[i];
    }
    scratch.p.copy_from(&scratch.r);

    let mut r2 = vecmath::dot(&scratch.r, &scratch.r);
    let b2 = vecmath::dot(b, b);
    let mut rel = if b2 > 0.0 { (r2 / b2).sqrt() } else { r2.sqrt() };

    let mut iters = 0;
    while rel > tol && iters < iter_max {
        a.apply(&scratch.p, &mut scratch.ap)?;
        let p_ap = vecmath::dot(&scratch.p, &scratch.ap);
        if p_ap == 0.0 {
            return Err(FemError::SingularDirection {
                op: "conjugate_gradient",
            });
        }
        let alpha = r2 / p_ap;

        vecmath::blas_axpy(alpha, &scratch.p, u);
        vecmath::blas_axpy(-alpha, &scratch.ap, &mut scratch.r);

        let r2_new = vecmath::dot(&scratch.r, &scratch.r);
        let beta = r2_new / r2;
        for i in 0..scratch.p.len() {
            scratch.p[i] = scratch.r[i] + beta * scratch.p[i];
        }
        r2 = r2_new;
        rel = if b2 > 0.0 { (r2 / b2).sqrt() } else { r2.sqrt() };

        iters += 1;
        log::debug!("conjugate_gradient iter {iters}: rel = {rel}");
    }

    let converged = rel <= tol;
    if !converged {
        log::warn!(
            "conjugate_gradient did not converge after {iters} iterations (rel = {rel}, tol = {tol})"
        );
    }
    Ok(SolveOutcome {
        converged,
        iterations: iters,
        rel_error: rel,
    })
}
