//! Advancing states of `x' = Ax` and `x' = Ax + Bu` by one time step.
//!
//! A `Propagator` is built once per tick and then applied to every tracked
//! state, since all trajectories share the same `A` and `dt`.

use crate::math::{
    build_block_matrix, expm2x2, expm4x4, extract_upper_left, extract_upper_right, Mat2, Vec2,
};

/// Affine one-step map `x ↦ free·x + forced`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Propagator {
    /// Free-response propagator `exp(dt·A)`
    pub free: Mat2,
    /// Contribution of the constant input over one step
    pub forced: Vec2,
}

impl Propagator {
    pub fn from_matrices(free: Mat2, input: Mat2, u: Vec2) -> Self {
        Self {
            free,
            forced: input * u,
        }
    }

    /// `exp(dt·A)` with no input
    pub fn autonomous(a: Mat2, dt: f64) -> Self {
        Self {
            free: expm2x2(dt * a),
            forced: Vec2::ZERO,
        }
    }

    /// Propagators of `x' = Ax + Bu` read off `exp(dt·[[A, B], [0, I]])`
    pub fn controlled(a: Mat2, b: Mat2, u: Vec2, dt: f64) -> Self {
        let (free, input) = control_propagators(a, b, dt);
        Self::from_matrices(free, input, u)
    }

    pub fn apply(&self, x: Vec2) -> Vec2 {
        self.free * x + self.forced
    }
}

/// Free- and input-response propagators for one step of `x' = Ax + Bu`
pub fn control_propagators(a: Mat2, b: Mat2, dt: f64) -> (Mat2, Mat2) {
    let exp_block = expm4x4(dt * build_block_matrix(a, b));
    (extract_upper_left(&exp_block), extract_upper_right(&exp_block))
}

/// Apply `propagator` to every state in place
pub fn advance(propagator: &Propagator, states: &mut [Vec2]) {
    for x in states.iter_mut() {
        *x = propagator.apply(*x);
    }
}

/// One autonomous step of every state; the propagator is computed once
pub fn step(a: Mat2, dt: f64, states: &mut [Vec2]) {
    advance(&Propagator::autonomous(a, dt), states);
}

/// One control-affine step of every state
pub fn step_with_control(a: Mat2, b: Mat2, u: Vec2, dt: f64, states: &mut [Vec2]) {
    advance(&Propagator::controlled(a, b, u, dt), states);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::IsApprox;

    fn sample_states() -> Vec<Vec2> {
        vec![
            Vec2::new(1.0, 0.0),
            Vec2::new(-3.5, 2.0),
            Vec2::new(12.0, -19.0),
            Vec2::ZERO,
        ]
    }

    #[test]
    fn test_step_applies_same_propagator_to_all() {
        let a = Mat2::from_rows([[-0.3, 1.0], [-2.0, -0.1]]);
        let dt = 0.02;
        let propagator = expm2x2(dt * a);

        let initial = sample_states();
        let mut states = initial.clone();
        step(a, dt, &mut states);

        for (before, after) in initial.iter().zip(&states) {
            assert!(after.is_approx(&(propagator * *before)));
        }
    }

    #[test]
    fn test_zero_control_matches_autonomous_step() {
        let a = Mat2::from_rows([[0.0, 1.0], [-1.0, 0.0]]);
        let dt = 0.02;

        let mut plain = sample_states();
        let mut controlled = sample_states();
        for _ in 0..50 {
            step(a, dt, &mut plain);
            step_with_control(a, Mat2::zero(), Vec2::ZERO, dt, &mut controlled);
        }
        for (p, c) in plain.iter().zip(&controlled) {
            assert!(p.is_approx(c), "{:?} vs {:?}", p, c);
        }
    }

    #[test]
    fn test_rotation_flow_over_many_steps() {
        // x' = y, y' = -x from (1, 0) after t = 1: (cos 1, -sin 1)
        let a = Mat2::from_rows([[0.0, 1.0], [-1.0, 0.0]]);
        let mut states = vec![Vec2::new(1.0, 0.0)];
        for _ in 0..50 {
            step(a, 0.02, &mut states);
        }
        let expected = Vec2::new(1.0f64.cos(), -(1.0f64.sin()));
        assert!(states[0].is_approx(&expected));
    }

    #[test]
    fn test_constant_input_pushes_state() {
        // A = 0, B = I, u = (1, 0): one step moves x by (e^dt - 1) along u
        let dt: f64 = 0.02;
        let mut states = vec![Vec2::new(2.0, 3.0)];
        step_with_control(Mat2::zero(), Mat2::identity(), Vec2::new(1.0, 0.0), dt, &mut states);
        assert!(states[0].is_approx(&Vec2::new(2.0 + dt.exp() - 1.0, 3.0)));
    }

    #[test]
    fn test_propagator_apply() {
        let p = Propagator::from_matrices(
            Mat2::identity(),
            Mat2::from_rows([[2.0, 0.0], [0.0, 3.0]]),
            Vec2::new(1.0, 1.0),
        );
        assert_eq!(p.forced, Vec2::new(2.0, 3.0));
        assert_eq!(p.apply(Vec2::new(1.0, -1.0)), Vec2::new(3.0, 2.0));
    }
}
