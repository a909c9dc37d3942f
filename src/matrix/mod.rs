//! The polymorphic matrix-vector-product interface and its four concrete kinds
//!
//! Grounded on `original_source/lib/include/Matrix/Matrix.h`'s abstract
//! `MVP` base class; Rust models that as a capability trait rather than
//! virtual dispatch.

pub mod csr;
pub mod diag;
pub mod fem;
pub mod skyline;

pub use csr::CsrMatrix;
pub use diag::DiagMatrix;
pub use fem::{FemKind, FemMatrix};
pub use skyline::SkylineMatrix;

use crate::error::FemResult;
use crate::vecmath::Vec;

/// Read-only matrix-vector-product capability shared by every concrete
/// matrix representation in this crate.
pub trait Matrix {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    /// `y <- A * x`
    fn apply(&self, x: &Vec, y: &mut Vec) -> FemResult<()>;
}

pub(crate) fn check_dims(op: &'static str, expected: usize, actual: usize) -> FemResult<()> {
    if expected != actual {
        return Err(crate::error::FemError::DimensionMismatch {
            op,
            expected,
            actual,
        });
    }
    Ok(())
}
