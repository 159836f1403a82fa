use std::fmt;
use std::ops::{Add, Mul, Sub};

use super::approx::IsApprox;
use super::vector::{ComplexVec2, Vec2};

/// 2x2 matrix of doubles, column-major.
///
/// `elems = [a11, a21, a12, a22]`, so the element at row `r`, column `c`
/// is `elems[2 * c + r]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mat2 {
    pub elems: [f64; 4],
}

impl Mat2 {
    /// Build from entries given in storage (column-major) order.
    pub const fn new(a11: f64, a21: f64, a12: f64, a22: f64) -> Self {
        Self {
            elems: [a11, a21, a12, a22],
        }
    }

    /// Build from rows, the way a matrix is written on paper
    pub const fn from_rows(rows: [[f64; 2]; 2]) -> Self {
        Self::new(rows[0][0], rows[1][0], rows[0][1], rows[1][1])
    }

    pub const fn from_columns(c1: Vec2, c2: Vec2) -> Self {
        Self::new(c1.x, c1.y, c2.x, c2.y)
    }

    /// Convert slider data laid out row-major as `[a11, a12, a21, a22]`
    pub fn from_row_major_f32(data: [f32; 4]) -> Self {
        Self::new(
            data[0] as f64,
            data[2] as f64,
            data[1] as f64,
            data[3] as f64,
        )
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < 2 && col < 2, "Mat2 index ({row}, {col}) out of range");
        self.elems[2 * col + row]
    }

    pub fn columns(&self) -> [Vec2; 2] {
        [
            Vec2::new(self.elems[0], self.elems[1]),
            Vec2::new(self.elems[2], self.elems[3]),
        ]
    }

    pub fn trace(&self) -> f64 {
        self.elems[0] + self.elems[3]
    }

    pub fn det(&self) -> f64 {
        self.elems[0] * self.elems[3] - self.elems[2] * self.elems[1]
    }
}

/// Matrix times vector: `result[r] = Σ_c A[r,c]·x[c]`
pub fn matvecmul(a: Mat2, x: Vec2) -> Vec2 {
    let [a11, a21, a12, a22] = a.elems;
    Vec2::new(a11 * x.x + a12 * x.y, a21 * x.x + a22 * x.y)
}

/// 2x2 matrix product
pub fn matmul(a: Mat2, b: Mat2) -> Mat2 {
    let [a11, a21, a12, a22] = a.elems;
    let [b11, b21, b12, b22] = b.elems;
    Mat2::new(
        a11 * b11 + a12 * b21,
        a21 * b11 + a22 * b21,
        a11 * b12 + a12 * b22,
        a21 * b12 + a22 * b22,
    )
}

/// Element-wise sum
pub fn add(a: Mat2, b: Mat2) -> Mat2 {
    let mut c = a;
    for (ci, bi) in c.elems.iter_mut().zip(b.elems) {
        *ci += bi;
    }
    c
}

/// Multiply every element by `t`
pub fn scale(t: f64, a: Mat2) -> Mat2 {
    Mat2 {
        elems: a.elems.map(|e| t * e),
    }
}

impl Add for Mat2 {
    type Output = Mat2;

    fn add(self, rhs: Mat2) -> Mat2 {
        add(self, rhs)
    }
}

impl Sub for Mat2 {
    type Output = Mat2;

    fn sub(self, rhs: Mat2) -> Mat2 {
        add(self, scale(-1.0, rhs))
    }
}

impl Mul for Mat2 {
    type Output = Mat2;

    fn mul(self, rhs: Mat2) -> Mat2 {
        matmul(self, rhs)
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        matvecmul(self, rhs)
    }
}

impl Mul<ComplexVec2> for Mat2 {
    type Output = ComplexVec2;

    fn mul(self, rhs: ComplexVec2) -> ComplexVec2 {
        let [a11, a21, a12, a22] = self.elems;
        let [c0, c1] = rhs.elems;
        ComplexVec2::new(a11 * c0 + a12 * c1, a21 * c0 + a22 * c1)
    }
}

impl Mul<f64> for Mat2 {
    type Output = Mat2;

    fn mul(self, rhs: f64) -> Mat2 {
        scale(rhs, self)
    }
}

impl Mul<Mat2> for f64 {
    type Output = Mat2;

    fn mul(self, rhs: Mat2) -> Mat2 {
        scale(self, rhs)
    }
}

impl IsApprox for Mat2 {
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool {
        self.elems.is_approx_tol(&other.elems, tol)
    }
}

impl fmt::Display for Mat2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ {:.6}\t{:.6}", self.elems[0], self.elems[2])?;
        write!(f, "  {:.6}\t{:.6} ]", self.elems[1], self.elems[3])
    }
}

/// 4x4 matrix of doubles, column-major (`elems[4 * c + r]`).
///
/// Only used as scratch space for block-matrix exponentials.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub elems: [f64; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::zero()
    }
}

impl Mat4 {
    pub const fn zero() -> Self {
        Self { elems: [0.0; 16] }
    }

    pub fn identity() -> Self {
        let mut m = Self::zero();
        for i in 0..4 {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from rows, the way a matrix is written on paper
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = Self::zero();
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                m.set(r, c, value);
            }
        }
        m
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.elems[4 * col + row]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.elems[4 * col + row] = value;
    }

    /// Assemble `[[tl, tr], [bl, br]]` from four 2x2 blocks
    pub fn from_blocks(tl: Mat2, tr: Mat2, bl: Mat2, br: Mat2) -> Self {
        let mut m = Self::zero();
        for (block, row0, col0) in [(tl, 0, 0), (tr, 0, 2), (bl, 2, 0), (br, 2, 2)] {
            for r in 0..2 {
                for c in 0..2 {
                    m.set(row0 + r, col0 + c, block.get(r, c));
                }
            }
        }
        m
    }

    /// The 2x2 block at block coordinates (`block_row`, `block_col`), each 0 or 1
    pub fn block(&self, block_row: usize, block_col: usize) -> Mat2 {
        let row0 = 2 * block_row;
        let col0 = 2 * block_col;
        Mat2::new(
            self.get(row0, col0),
            self.get(row0 + 1, col0),
            self.get(row0, col0 + 1),
            self.get(row0 + 1, col0 + 1),
        )
    }
}

impl Add for Mat4 {
    type Output = Mat4;

    fn add(self, rhs: Mat4) -> Mat4 {
        let mut c = self;
        for (ci, bi) in c.elems.iter_mut().zip(rhs.elems) {
            *ci += bi;
        }
        c
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut c = Mat4::zero();
        for col in 0..4 {
            for row in 0..4 {
                for k in 0..4 {
                    c.elems[4 * col + row] += self.get(row, k) * rhs.get(k, col);
                }
            }
        }
        c
    }
}

impl Mul<f64> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: f64) -> Mat4 {
        Mat4 {
            elems: self.elems.map(|e| rhs * e),
        }
    }
}

impl Mul<Mat4> for f64 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        rhs * self
    }
}

impl IsApprox for Mat4 {
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool {
        self.elems.is_approx_tol(&other.elems, tol)
    }
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for r in 0..4 {
            writeln!(
                f,
                "[{:.6}, {:.6}, {:.6}, {:.6}]",
                self.get(r, 0),
                self.get(r, 1),
                self.get(r, 2),
                self.get(r, 3)
            )?;
        }
        write!(f, "]")
    }
}
