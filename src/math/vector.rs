use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use super::approx::IsApprox;
use super::complex::Complex;

/// A point or direction in the phase plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Narrow to single precision for the renderer
    pub fn to_f32(self) -> [f32; 2] {
        [self.x as f32, self.y as f32]
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl IsApprox for Vec2 {
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool {
        self.x.is_approx_tol(&other.x, tol) && self.y.is_approx_tol(&other.y, tol)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.x, self.y)
    }
}

/// Two-component complex vector, used for eigenvectors.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComplexVec2 {
    pub elems: [Complex; 2],
}

impl ComplexVec2 {
    pub const fn new(c0: Complex, c1: Complex) -> Self {
        Self { elems: [c0, c1] }
    }

    /// Norm of the pair viewed as a 4-dimensional real vector: `sqrt(|c0|² + |c1|²)`
    pub fn norm(self) -> f64 {
        (self.elems[0].norm_sqr() + self.elems[1].norm_sqr()).sqrt()
    }

    /// Scale to unit norm. The vector must be non-zero.
    pub fn normalize(self) -> Self {
        (1.0 / self.norm()) * self
    }

    pub fn real(self) -> Vec2 {
        Vec2::new(self.elems[0].re, self.elems[1].re)
    }

    pub fn imag(self) -> Vec2 {
        Vec2::new(self.elems[0].im, self.elems[1].im)
    }
}

impl Mul<ComplexVec2> for f64 {
    type Output = ComplexVec2;

    fn mul(self, rhs: ComplexVec2) -> ComplexVec2 {
        ComplexVec2::new(self * rhs.elems[0], self * rhs.elems[1])
    }
}

impl Mul<ComplexVec2> for Complex {
    type Output = ComplexVec2;

    fn mul(self, rhs: ComplexVec2) -> ComplexVec2 {
        ComplexVec2::new(self * rhs.elems[0], self * rhs.elems[1])
    }
}

impl IsApprox for ComplexVec2 {
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool {
        self.elems.is_approx_tol(&other.elems, tol)
    }
}
