//! Diagonal matrix storage
//!
//! Grounded on `original_source/lib/src/Matrix/diagMatrix.cpp`: a diagonal
//! matrix is just its diagonal vector, used both as a lumped-mass
//! preconditioner and to extract the diagonal of a [`super::CsrMatrix`] for
//! Jacobi smoothing.

use rayon::prelude::*;

use super::{check_dims, CsrMatrix, Matrix};
use crate::error::FemResult;
use crate::vecmath::Vec;

/// A diagonal matrix, stored as its diagonal entries
pub struct DiagMatrix {
    pub diag: Vec,
}

impl DiagMatrix {
    pub fn new(diag: Vec) -> DiagMatrix {
        DiagMatrix { diag }
    }

    /// Extract the diagonal of a CSR matrix.
    ///
    /// Grounded on `original_source/lib/src/linalg/fem.cpp`'s
    /// `buildDiagMatrix`.
    pub fn from_csr_diagonal(csr: &CsrMatrix) -> DiagMatrix {
        let mut diag = crate::vecmath::zeros(csr.rows);
        for i in 0..csr.rows {
            diag[i] = csr.get(i, i);
        }
        DiagMatrix { diag }
    }

    /// `y <- D^-1 * x`
    pub fn apply_inverse(&self, x: &Vec, y: &mut Vec) -> FemResult<()> {
        check_dims("DiagMatrix::apply_inverse(x)", self.diag.len(), x.len())?;
        check_dims("DiagMatrix::apply_inverse(y)", self.diag.len(), y.len())?;
        y.as_mut_slice()
            .par_iter_mut()
            .zip(self.diag.as_slice())
            .zip(x.as_slice())
            .for_each(|((yi, di), xi)| *yi = xi / di);
        Ok(())
    }
}

impl Matrix for DiagMatrix {
    fn rows(&self) -> usize {
        self.diag.len()
    }

    fn cols(&self) -> usize {
        self.diag.len()
    }

    fn apply(&self, x: &Vec, y: &mut Vec) -> FemResult<()> {
        check_dims("DiagMatrix::apply(x)", self.diag.len(), x.len())?;
        check_dims("DiagMatrix::apply(y)", self.diag.len(), y.len())?;
        y.as_mut_slice()
            .par_iter_mut()
            .zip(self.diag.as_slice())
            .zip(x.as_slice())
            .for_each(|((yi, di), xi)| *yi = xi * di);
        Ok(())
    }
}
