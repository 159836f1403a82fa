//! Block-matrix embedding of the control-affine system `x' = Ax + Bu`.
//!
//! With constant `u`, stacking `[x; u]` turns the forced system into an
//! autonomous one with matrix `[[A, B], [0, I]]`. One `expm` of the 4x4
//! block then yields both propagators: the upper-left block advances the
//! state and the upper-right block maps `u` into the state.
//!
//! See <https://math.stackexchange.com/questions/658276/integral-of-matrix-exponential/4105683#4105683>
//!
//! The lower-right block is the identity, so the upper-right block of
//! `exp(dt·Ã)` is `∫₀^dt e^{A(dt-s)} B eˢ ds`.

use super::matrix::{Mat2, Mat4};

/// `[[a, b], [0, I]]`
pub fn build_block_matrix(a: Mat2, b: Mat2) -> Mat4 {
    Mat4::from_blocks(a, b, Mat2::zero(), Mat2::identity())
}

/// Free-response propagator from `exp(dt·Ã)`
pub fn extract_upper_left(m: &Mat4) -> Mat2 {
    m.block(0, 0)
}

/// Input-response propagator from `exp(dt·Ã)`
pub fn extract_upper_right(m: &Mat4) -> Mat2 {
    m.block(0, 1)
}
