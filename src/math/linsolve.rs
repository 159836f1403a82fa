use thiserror::Error;

use super::matrix::Mat2;
use super::vector::Vec2;
use crate::config::SINGULAR_EPSILON;

/// `linsolve2x2` was handed a matrix whose determinant is too close to zero.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("matrix is singular (determinant {determinant:.3e})")]
pub struct SingularMatrixError {
    pub determinant: f64,
}

/// Solve `v · c = x` for `c` with Cramer's rule.
pub fn linsolve2x2(v: Mat2, x: Vec2) -> Result<Vec2, SingularMatrixError> {
    let [v11, v21, v12, v22] = v.elems;
    let det = v11 * v22 - v12 * v21;
    if det.abs() < SINGULAR_EPSILON {
        return Err(SingularMatrixError { determinant: det });
    }
    Ok(Vec2::new(
        (v22 * x.x - v12 * x.y) / det,
        (v11 * x.y - v21 * x.x) / det,
    ))
}
