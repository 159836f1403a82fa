//! Ready-made dynamics matrices.

use crate::math::Mat2;

/// Damped mass-spring system `m·x'' = -k·x - c·x'` in the state `(x, x')`.
///
/// `mass` must be non-zero.
pub fn harmonic_oscillator(mass: f64, k_spring: f64, k_friction: f64) -> Mat2 {
    Mat2::from_rows([[0.0, 1.0], [-k_spring / mass, -k_friction / mass]])
}

/// Undamped unit-frequency rotation `x' = y, y' = -x`
pub fn rotation() -> Mat2 {
    Mat2::from_rows([[0.0, 1.0], [-1.0, 0.0]])
}

/// Every state stays where it is
pub fn zero() -> Mat2 {
    Mat2::zero()
}
