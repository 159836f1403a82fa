//! Small fixed-size linear algebra for 2-D linear systems.
//!
//! Everything here is value-in/value-out and never logs. Matrices are
//! stored column-major: the element at row `r`, column `c` of an `n x n`
//! matrix lives at index `n * c + r`.

pub mod approx;
pub mod block;
pub mod complex;
pub mod eigen;
pub mod expm;
pub mod linsolve;
pub mod matrix;
pub mod vector;

pub use approx::IsApprox;
pub use block::{build_block_matrix, extract_upper_left, extract_upper_right};
pub use complex::Complex;
pub use eigen::{eigen_components, eigendecompose, Eigen};
pub use expm::{expm, expm2x2, expm4x4, SquareMatrix};
pub use linsolve::{linsolve2x2, SingularMatrixError};
pub use matrix::{add, matmul, matvecmul, scale, Mat2, Mat4};
pub use vector::{ComplexVec2, Vec2};
