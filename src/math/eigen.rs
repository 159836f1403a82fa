//! Closed-form eigendecomposition of real 2x2 matrices.
//!
//! References:
//! - <https://en.wikipedia.org/wiki/Eigenvalue_algorithm#2%C3%972_matrices>
//! - <https://people.math.harvard.edu/~knill/teaching/math21b2004/exhibits/2dmatrices/index.html>

use super::complex::Complex;
use super::linsolve::{linsolve2x2, SingularMatrixError};
use super::matrix::Mat2;
use super::vector::{ComplexVec2, Vec2};

/// Eigenvalues and unit-norm eigenvectors; `vectors[k]` belongs to `values[k]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eigen {
    pub values: [Complex; 2],
    pub vectors: [ComplexVec2; 2],
}

impl Eigen {
    /// True when both eigenvalues have an imaginary part of exactly zero
    pub fn is_real(&self) -> bool {
        self.values.iter().all(|v| v.is_real())
    }

    /// Real parts of the two eigenvectors
    pub fn real_vectors(&self) -> [Vec2; 2] {
        [self.vectors[0].real(), self.vectors[1].real()]
    }

    /// Matrix whose columns are the real parts of v1 and v2
    pub fn real_basis(&self) -> Mat2 {
        let [v1, v2] = self.real_vectors();
        Mat2::from_columns(v1, v2)
    }
}

/// Eigenvalues and eigenvectors of `a`.
///
/// A negative discriminant gives the conjugate pair `tr/2 ± i·sqrt(-disc)/2`;
/// otherwise `λ1 = (tr + sqrt(disc))/2 ≥ λ2 = (tr - sqrt(disc))/2`.
///
/// Eigenvectors come from whichever off-diagonal entry is non-zero, checked
/// in the order a21 then a12; a diagonal matrix gets the coordinate axes.
/// Those are ordered so `v1` pairs with `λ1 = max(a11, a22)`, so `(0, 1)`
/// comes first when `a22 > a11` rather than always `v1 = (1, 0)`.
/// A defective matrix (repeated eigenvalue with a single eigendirection)
/// is not detected and yields the same direction twice.
pub fn eigendecompose(a: Mat2) -> Eigen {
    let [a11, a21, a12, a22] = a.elems;

    let trace = a11 + a22;
    let det = a11 * a22 - a12 * a21;
    let discriminant = trace * trace - 4.0 * det;

    let (l1, l2) = if discriminant < 0.0 {
        let l1 = Complex::new(0.5 * trace, 0.5 * (-discriminant).sqrt());
        (l1, l1.conj())
    } else {
        let sqrt_disc = discriminant.sqrt();
        (
            Complex::real(0.5 * (trace + sqrt_disc)),
            Complex::real(0.5 * (trace - sqrt_disc)),
        )
    };

    let (v1, v2) = if a21 != 0.0 {
        (
            ComplexVec2::new(l1 - a22, Complex::real(a21)),
            ComplexVec2::new(l2 - a22, Complex::real(a21)),
        )
    } else if a12 != 0.0 {
        (
            ComplexVec2::new(Complex::real(a12), l1 - a11),
            ComplexVec2::new(Complex::real(a12), l2 - a11),
        )
    } else {
        // Diagonal: the axes themselves, ordered so v1 belongs to λ1 = max(a11, a22)
        let e1 = ComplexVec2::new(Complex::ONE, Complex::ZERO);
        let e2 = ComplexVec2::new(Complex::ZERO, Complex::ONE);
        if a11 >= a22 {
            (e1, e2)
        } else {
            (e2, e1)
        }
    };

    Eigen {
        values: [l1, l2],
        vectors: [v1.normalize(), v2.normalize()],
    }
}

/// Split `x` into its components along the real eigendirections.
///
/// Returns `[c1·v1, c2·v2]` where `x = c1·v1 + c2·v2`. Fails when the real
/// parts of the eigenvectors are (nearly) parallel.
pub fn eigen_components(eigen: &Eigen, x: Vec2) -> Result<[Vec2; 2], SingularMatrixError> {
    let [v1, v2] = eigen.real_vectors();
    let c = linsolve2x2(eigen.real_basis(), x)?;
    Ok([c.x * v1, c.y * v2])
}
