use crate::config::DEFAULT_TOLERANCE;

/// Approximate equality with a fixed absolute tolerance.
///
/// Floating-point values in this crate are never compared exactly; composite
/// types compare every component pairwise.
pub trait IsApprox {
    /// True when every component differs by at most `tol`
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool;

    fn is_approx(&self, other: &Self) -> bool {
        self.is_approx_tol(other, DEFAULT_TOLERANCE)
    }
}

impl IsApprox for f64 {
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool {
        (self - other).abs() <= tol
    }
}

impl IsApprox for f32 {
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool {
        (self - other).abs() <= tol as f32
    }
}

impl<T: IsApprox, const N: usize> IsApprox for [T; N] {
    fn is_approx_tol(&self, other: &Self, tol: f64) -> bool {
        self.iter()
            .zip(other.iter())
            .all(|(a, b)| a.is_approx_tol(b, tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_is_inclusive() {
        assert!(1.0f64.is_approx_tol(&1.5, 0.5));
        assert!(!1.0f64.is_approx_tol(&1.5001, 0.5));
    }

    #[test]
    fn test_default_tolerance() {
        assert!(1.0f64.is_approx(&(1.0 + 5e-6)));
        assert!(!1.0f64.is_approx(&(1.0 + 2e-5)));
        assert!(0.25f32.is_approx(&0.250001));
    }

    #[test]
    fn test_arrays_compare_elementwise() {
        assert!([1.0f64, 2.0, 3.0].is_approx(&[1.0, 2.0, 3.000001]));
        assert!(![1.0f64, 2.0, 3.0].is_approx(&[1.0, 2.1, 3.0]));
    }
}
