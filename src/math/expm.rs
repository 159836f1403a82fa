//! Matrix exponential by truncated Taylor series.
//!
//! `exp(M) ≈ Σ_{k=0}^{EXPM_TERMS-1} M^k / k!` with a fixed number of terms,
//! no scaling-and-squaring and no error estimate. This is accurate for the
//! small `dt·A` the visualizer feeds it (entries of `A` within ±20,
//! `dt` around 0.02) and is NOT a general purpose `expm`: the error grows
//! quickly once `‖M‖` is much larger than one.

use std::ops::{Add, Mul};

use super::matrix::{Mat2, Mat4};
use crate::config::EXPM_TERMS;

/// Square matrices the series can be summed over.
pub trait SquareMatrix:
    Copy + Add<Output = Self> + Mul<Output = Self> + Mul<f64, Output = Self>
{
    fn identity() -> Self;
}

impl SquareMatrix for Mat2 {
    fn identity() -> Self {
        Mat2::identity()
    }
}

impl SquareMatrix for Mat4 {
    fn identity() -> Self {
        Mat4::identity()
    }
}

/// Exponential of `m`. Callers pre-scale by the time step, i.e. pass `dt * A`.
pub fn expm<M: SquareMatrix>(m: M) -> M {
    let mut result = M::identity();
    let mut power = M::identity();
    // running k!
    let mut factorial = 1.0f64;
    for k in 1..EXPM_TERMS {
        power = power * m;
        factorial *= k as f64;
        result = result + power * (1.0 / factorial);
    }
    result
}

pub fn expm2x2(m: Mat2) -> Mat2 {
    expm(m)
}

pub fn expm4x4(m: Mat4) -> Mat4 {
    expm(m)
}
